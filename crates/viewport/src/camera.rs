use foundation::bounds::PixelRect;
use foundation::math::{DVec2, DVec3, Ray, ScreenPoint, ViewportPoint, WorldPoint};
use scene::components::Transform;
use serde::{Deserialize, Serialize};

/// Smallest aspect ratio a camera accepts; degenerate targets are clamped.
pub const MIN_ASPECT: f64 = 1e-3;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Vertical field of view in degrees.
    Perspective { fov_y_deg: f64 },
    /// Half of the visible height in world units.
    Orthographic { size: f64 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective { fov_y_deg: 60.0 }
    }
}

/// A camera that looks along its local -Z with +Y up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    pub projection: Projection,
    pixel_rect: PixelRect,
    aspect: f64,
}

impl Camera {
    pub fn new(transform: Transform, projection: Projection, pixel_rect: PixelRect) -> Self {
        let mut camera = Self {
            transform,
            projection,
            pixel_rect,
            aspect: 1.0,
        };
        camera.set_pixel_rect(pixel_rect);
        camera
    }

    pub fn perspective(fov_y_deg: f64, pixel_rect: PixelRect) -> Self {
        Self::new(
            Transform::identity(),
            Projection::Perspective { fov_y_deg },
            pixel_rect,
        )
    }

    pub fn orthographic(size: f64, pixel_rect: PixelRect) -> Self {
        Self::new(
            Transform::identity(),
            Projection::Orthographic { size },
            pixel_rect,
        )
    }

    pub fn pixel_rect(&self) -> PixelRect {
        self.pixel_rect
    }

    /// Also adopts the rect's aspect ratio when it has area.
    pub fn set_pixel_rect(&mut self, rect: PixelRect) {
        self.pixel_rect = rect;
        if !rect.is_empty() {
            self.set_aspect(rect.aspect());
        }
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        self.aspect = if aspect.is_nan() {
            1.0
        } else {
            aspect.clamp(MIN_ASPECT, 1.0 / MIN_ASPECT)
        };
    }

    /// A camera without pixels cannot convert screen positions.
    pub fn is_ready(&self) -> bool {
        !self.pixel_rect.is_empty()
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    pub fn ortho_size(&self) -> Option<f64> {
        match self.projection {
            Projection::Orthographic { size } => Some(size),
            Projection::Perspective { .. } => None,
        }
    }

    /// No-op for perspective cameras.
    pub fn set_ortho_size(&mut self, size: f64) {
        if let Projection::Orthographic { size: s } = &mut self.projection {
            *s = size;
        }
    }

    pub fn position(&self) -> DVec3 {
        self.transform.position
    }

    pub fn forward(&self) -> DVec3 {
        self.transform.forward()
    }

    pub fn right(&self) -> DVec3 {
        self.transform.right()
    }

    pub fn up(&self) -> DVec3 {
        self.transform.up()
    }

    /// Half width and half height of the visible slice at `depth` along the
    /// view direction. Orthographic extents do not depend on depth.
    pub fn half_extents_at(&self, depth: f64) -> DVec2 {
        let half_h = match self.projection {
            Projection::Perspective { fov_y_deg } => depth * (fov_y_deg.to_radians() * 0.5).tan(),
            Projection::Orthographic { size } => size,
        };
        DVec2::new(half_h * self.aspect, half_h)
    }

    /// Distance at which an object `height` tall exactly fills the view
    /// vertically. Orthographic cameras fit by size instead and return
    /// `height` as a comfortable standoff.
    pub fn fit_distance(&self, height: f64) -> f64 {
        match self.projection {
            Projection::Perspective { fov_y_deg } => {
                height * 0.5 / (fov_y_deg.to_radians() * 0.5).tan()
            }
            Projection::Orthographic { .. } => height,
        }
    }

    pub fn screen_to_viewport(&self, p: ScreenPoint) -> Option<ViewportPoint> {
        self.pixel_rect.normalize(p)
    }

    pub fn viewport_to_screen(&self, v: ViewportPoint) -> ScreenPoint {
        self.pixel_rect.denormalize(v)
    }

    pub fn viewport_ray(&self, v: ViewportPoint) -> Option<Ray> {
        let ndc = v.0 * 2.0 - DVec2::ONE;
        match self.projection {
            Projection::Perspective { .. } => {
                let half = self.half_extents_at(1.0);
                let local = DVec3::new(ndc.x * half.x, ndc.y * half.y, -1.0);
                Ray::new(self.position(), self.transform.rotation * local)
            }
            Projection::Orthographic { .. } => {
                let half = self.half_extents_at(0.0);
                let origin = self.position() + self.right() * (ndc.x * half.x) + self.up() * (ndc.y * half.y);
                Ray::new(origin, self.forward())
            }
        }
    }

    /// Ray through a host pixel; `None` when the camera has no pixels.
    pub fn screen_ray(&self, p: ScreenPoint) -> Option<Ray> {
        self.viewport_ray(self.screen_to_viewport(p)?)
    }

    pub fn depth_of(&self, p: WorldPoint) -> f64 {
        (p.0 - self.position()).dot(self.forward())
    }

    /// Projects a world point; `None` for points behind a perspective camera.
    pub fn world_to_viewport(&self, p: WorldPoint) -> Option<ViewportPoint> {
        let rel = self.transform.rotation.inverse() * (p.0 - self.position());
        let depth = -rel.z;
        if !self.is_orthographic() && depth <= 1e-12 {
            return None;
        }
        let half = self.half_extents_at(depth);
        Some(ViewportPoint(
            DVec2::new(rel.x / half.x, rel.y / half.y) * 0.5 + DVec2::splat(0.5),
        ))
    }

    pub fn viewport_to_world(&self, v: ViewportPoint, depth: f64) -> WorldPoint {
        let ndc = v.0 * 2.0 - DVec2::ONE;
        let half = self.half_extents_at(depth);
        let local = DVec3::new(ndc.x * half.x, ndc.y * half.y, -depth);
        WorldPoint(self.position() + self.transform.rotation * local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::DQuat;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    fn camera() -> Camera {
        let mut c = Camera::perspective(60.0, PixelRect::from_size(800.0, 400.0));
        c.transform.position = DVec3::new(0.0, 0.0, 50.0);
        c
    }

    #[test]
    fn aspect_follows_pixel_rect_and_is_clamped() {
        let mut c = camera();
        assert_eq!(c.aspect(), 2.0);
        c.set_aspect(0.0);
        assert_eq!(c.aspect(), MIN_ASPECT);
        c.set_pixel_rect(PixelRect::from_size(0.0, 0.0));
        assert!(!c.is_ready());
        assert_eq!(c.aspect(), MIN_ASPECT);
    }

    #[test]
    fn center_ray_is_forward() {
        let c = camera();
        let ray = c.screen_ray(ScreenPoint::new(400.0, 200.0)).unwrap();
        assert!(close(ray.dir, DVec3::NEG_Z));
        assert!(close(ray.origin, DVec3::new(0.0, 0.0, 50.0)));
    }

    #[test]
    fn world_viewport_round_trip() {
        let mut c = camera();
        c.transform.rotation = DQuat::from_rotation_x(0.3);
        let v = ViewportPoint::new(0.2, 0.9);
        let w = c.viewport_to_world(v, 12.0);
        let back = c.world_to_viewport(w).unwrap();
        assert!((back.0 - v.0).length() < 1e-9);
        assert!((c.depth_of(w) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn points_behind_perspective_camera_do_not_project() {
        let c = camera();
        assert!(c.world_to_viewport(WorldPoint::new(0.0, 0.0, 60.0)).is_none());
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let mut c = Camera::orthographic(10.0, PixelRect::from_size(200.0, 100.0));
        c.transform.position = DVec3::new(0.0, 0.0, 5.0);
        let ray = c.viewport_ray(ViewportPoint::new(1.0, 0.0)).unwrap();
        assert!(close(ray.dir, DVec3::NEG_Z));
        assert!(close(ray.origin, DVec3::new(20.0, -10.0, 5.0)));
    }

    #[test]
    fn fit_distance_frames_height() {
        let c = camera();
        let d = c.fit_distance(100.0);
        assert!((c.half_extents_at(d).y - 50.0).abs() < 1e-9);
    }
}
