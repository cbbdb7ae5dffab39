use serde::{Deserialize, Serialize};

use super::DVec3;

/// A ray with a normalized direction.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

impl Ray {
    /// Builds a ray; returns `None` for a zero or non-finite direction.
    pub fn new(origin: DVec3, dir: DVec3) -> Option<Self> {
        let dir = dir.try_normalize()?;
        Some(Self { origin, dir })
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }
}

/// Infinite plane through `point` with unit `normal`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: DVec3,
    pub normal: DVec3,
}

impl Plane {
    pub fn new(point: DVec3, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self { point, normal })
    }

    /// Signed distance from `p` to the plane, positive on the normal side.
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        (p - self.point).dot(self.normal)
    }

    /// Ray parameter of the intersection, if the ray hits the plane at `t >= 0`.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let denom = ray.dir.dot(self.normal);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t.is_finite() && t >= 0.0 { Some(t) } else { None }
    }

    pub fn project(&self, p: DVec3) -> DVec3 {
        p - self.normal * self.signed_distance(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_rejects_zero_direction() {
        assert!(Ray::new(DVec3::ZERO, DVec3::ZERO).is_none());
    }

    #[test]
    fn ray_hits_plane_in_front_only() {
        let plane = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        let down = Ray::new(DVec3::new(1.0, 2.0, 10.0), -DVec3::Z).unwrap();
        let t = plane.intersect(&down).unwrap();
        assert_eq!(t, 10.0);
        assert_eq!(down.at(t), DVec3::new(1.0, 2.0, 0.0));

        let up = Ray::new(DVec3::new(0.0, 0.0, 10.0), DVec3::Z).unwrap();
        assert!(plane.intersect(&up).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let plane = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        let ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), DVec3::X).unwrap();
        assert!(plane.intersect(&ray).is_none());
    }

    #[test]
    fn signed_distance_and_projection() {
        let plane = Plane::new(DVec3::new(0.0, 0.0, 2.0), DVec3::Z).unwrap();
        let p = DVec3::new(3.0, 4.0, 7.0);
        assert_eq!(plane.signed_distance(p), 5.0);
        assert_eq!(plane.project(p), DVec3::new(3.0, 4.0, 2.0));
    }
}
