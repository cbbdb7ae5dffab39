pub use glam::{DQuat, DVec2, DVec3};

/// Half extent of the map quad in map-local units.
///
/// Local x and y range over `[-MAP_HALF_EXTENT, MAP_HALF_EXTENT]`.
pub const MAP_HALF_EXTENT: f64 = 0.5;

/// Map-local axes. The map lies in the local XY plane and faces +Z.
pub const MAP_LOCAL_RIGHT: DVec3 = DVec3::X;
pub const MAP_LOCAL_UP: DVec3 = DVec3::Y;
pub const MAP_LOCAL_NORMAL: DVec3 = DVec3::Z;

/// Map quad corners, counter-clockwise from bottom-left.
pub const MAP_LOCAL_CORNERS: [DVec2; 4] = [
    DVec2::new(-MAP_HALF_EXTENT, -MAP_HALF_EXTENT),
    DVec2::new(MAP_HALF_EXTENT, -MAP_HALF_EXTENT),
    DVec2::new(MAP_HALF_EXTENT, MAP_HALF_EXTENT),
    DVec2::new(-MAP_HALF_EXTENT, MAP_HALF_EXTENT),
];

#[inline]
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Cubic ease-in/ease-out on `[0, 1]`; inputs outside the range are clamped.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}

/// Removes the component of `v` along the unit vector `normal`.
#[inline]
pub fn reject_from(v: DVec3, normal: DVec3) -> DVec3 {
    v - normal * v.dot(normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_hits_endpoints_and_midpoint() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(7.0), 1.0);
    }

    #[test]
    fn corners_span_the_unit_quad() {
        let min = MAP_LOCAL_CORNERS
            .iter()
            .fold(DVec2::splat(f64::INFINITY), |a, c| a.min(*c));
        let max = MAP_LOCAL_CORNERS
            .iter()
            .fold(DVec2::splat(f64::NEG_INFINITY), |a, c| a.max(*c));
        assert_eq!(max - min, DVec2::ONE);
    }

    #[test]
    fn reject_from_drops_normal_component() {
        let v = reject_from(DVec3::new(1.0, 2.0, 3.0), MAP_LOCAL_NORMAL);
        assert_eq!(v, DVec3::new(1.0, 2.0, 0.0));
    }
}
