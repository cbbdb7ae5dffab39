use foundation::math::{
    LocalPoint, MAP_HALF_EXTENT, Ray, WorldPoint, cmp_key_then_index,
};
use scene::components::Transform;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

impl ColliderId {
    /// The navigable map quad.
    pub const MAP: Self = ColliderId(0);
    /// The proxy surface displaying the offscreen texture.
    pub const PROXY: Self = ColliderId(1);
    /// Host occluders are numbered from here.
    pub const FIRST_OCCLUDER: u32 = 2;
}

/// Unit quad in its local XY plane (`[-0.5, 0.5]²`) placed by `transform`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadCollider {
    pub id: ColliderId,
    pub transform: Transform,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaycastHit {
    pub collider: ColliderId,
    pub distance: f64,
    pub point: WorldPoint,
    /// Hit position in the collider's local quad coordinates.
    pub local: LocalPoint,
}

const EDGE_SLACK: f64 = 1e-12;

impl QuadCollider {
    pub fn new(id: ColliderId, transform: Transform) -> Self {
        Self { id, transform }
    }

    /// Two-sided ray/quad intersection.
    pub fn raycast(&self, ray: &Ray) -> Option<RaycastHit> {
        let (distance, local) = self.plane_hit(ray)?;
        if local.x().abs() > MAP_HALF_EXTENT + EDGE_SLACK
            || local.y().abs() > MAP_HALF_EXTENT + EDGE_SLACK
        {
            return None;
        }
        Some(RaycastHit {
            collider: self.id,
            distance,
            point: WorldPoint(ray.at(distance)),
            local,
        })
    }

    /// Intersection with the quad's infinite plane as `(distance, local)`.
    pub fn plane_hit(&self, ray: &Ray) -> Option<(f64, LocalPoint)> {
        // The transform is affine, so the ray parameter carries over unchanged.
        let o = self.transform.inverse_transform_point(ray.origin);
        let d = self.transform.inverse_transform_vector(ray.dir);
        if d.z.abs() < 1e-12 {
            return None;
        }
        let t = -o.z / d.z;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        Some((t, LocalPoint((o + d * t).truncate())))
    }
}

/// Closest hit over `colliders`; equal distances go to the lower id.
pub fn raycast_nearest(colliders: &[QuadCollider], ray: &Ray) -> Option<RaycastHit> {
    colliders
        .iter()
        .filter_map(|c| c.raycast(ray))
        .min_by(|a, b| {
            cmp_key_then_index(
                (a.distance, a.collider.0 as usize),
                (b.distance, b.collider.0 as usize),
            )
        })
}
