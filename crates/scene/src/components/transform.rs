use foundation::math::{
    DQuat, DVec2, DVec3, LocalPoint, MAP_LOCAL_NORMAL, Plane, WorldPoint,
};
use serde::{Deserialize, Serialize};

/// Position, rotation and non-uniform scale.
///
/// Cameras look along their local -Z. The map quad lies in its local XY plane
/// with its normal along local +Z and `scale.x/y` equal to the map's world
/// width/height.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }

    pub fn translate(position: DVec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * (self.scale * local)
    }

    pub fn inverse_transform_point(&self, world: DVec3) -> DVec3 {
        (self.rotation.inverse() * (world - self.position)) / self.scale
    }

    pub fn transform_vector(&self, local: DVec3) -> DVec3 {
        self.rotation * (self.scale * local)
    }

    /// Direction into local space; not renormalized, so ray parameters are
    /// preserved across the change of frame.
    pub fn inverse_transform_vector(&self, world: DVec3) -> DVec3 {
        (self.rotation.inverse() * world) / self.scale
    }

    pub fn right(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::NEG_Z
    }

    /// World-space normal of the local XY plane.
    pub fn normal(&self) -> DVec3 {
        self.rotation * MAP_LOCAL_NORMAL
    }

    pub fn plane(&self) -> Plane {
        Plane {
            point: self.position,
            normal: self.normal(),
        }
    }

    pub fn local_to_world(&self, p: LocalPoint) -> WorldPoint {
        WorldPoint(self.transform_point(p.extend()))
    }

    /// Drops the out-of-plane component.
    pub fn world_to_local(&self, p: WorldPoint) -> LocalPoint {
        LocalPoint(self.inverse_transform_point(p.0).truncate())
    }

    /// World-space width and height of the local unit quad.
    pub fn plane_size(&self) -> DVec2 {
        self.scale.truncate().abs()
    }

    pub fn lerp(&self, other: &Transform, s: f64) -> Transform {
        Transform {
            position: self.position.lerp(other.position, s),
            rotation: self.rotation.slerp(other.rotation, s),
            scale: self.scale.lerp(other.scale, s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::{DQuat, DVec3, LocalPoint};

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn identity_is_origin() {
        let t = Transform::identity();
        assert_eq!(t.position, DVec3::ZERO);
        assert_eq!(t.forward(), DVec3::NEG_Z);
        assert_eq!(t.normal(), DVec3::Z);
    }

    #[test]
    fn point_round_trips_through_scaled_rotated_frame() {
        let t = Transform::translate(DVec3::new(3.0, -2.0, 5.0))
            .with_rotation(DQuat::from_rotation_y(0.7))
            .with_scale(DVec3::new(200.0, 100.0, 1.0));
        let local = DVec3::new(0.25, -0.4, 0.0);
        let world = t.transform_point(local);
        assert!(close(t.inverse_transform_point(world), local));
    }

    #[test]
    fn local_points_map_to_scaled_plane() {
        let t = Transform::identity().with_scale(DVec3::new(200.0, 100.0, 1.0));
        let w = t.local_to_world(LocalPoint::new(0.5, -0.5));
        assert_eq!(w.0, DVec3::new(100.0, -50.0, 0.0));
        assert_eq!(t.world_to_local(w), LocalPoint::new(0.5, -0.5));
    }
}
