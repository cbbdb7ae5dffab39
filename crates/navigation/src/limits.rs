use foundation::math::{DVec2, DVec3, Ray, ViewportPoint};
use scene::components::Transform;
use viewport::{Camera, map_viewport_rect};

use crate::config::NavigationConfig;

/// Orthographic sizes never shrink below this.
pub const MIN_ORTHO_SIZE: f64 = 1e-3;

/// Zoom range for one map, derived from the configured multiples of the
/// map's world height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomLimits {
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_ortho_size: f64,
    pub max_ortho_size: f64,
}

impl ZoomLimits {
    pub fn for_map(config: &NavigationConfig, map: &Transform) -> Self {
        let height = map.plane_size().y;
        let min_distance = config.min_zoom_distance * height;
        let max_distance = (config.max_zoom_distance * height).max(min_distance);
        Self {
            min_distance,
            max_distance,
            min_ortho_size: MIN_ORTHO_SIZE,
            max_ortho_size: (max_distance * 0.5).max(MIN_ORTHO_SIZE),
        }
    }

    /// Clamps a signed plane distance by its square, keeping the side.
    pub fn clamp_distance(&self, distance: f64) -> f64 {
        let sq = (distance * distance).clamp(
            self.min_distance * self.min_distance,
            self.max_distance * self.max_distance,
        );
        let side = if distance < 0.0 { -1.0 } else { 1.0 };
        sq.sqrt() * side
    }

    pub fn clamp_ortho(&self, size: f64) -> f64 {
        size.clamp(self.min_ortho_size, self.max_ortho_size)
    }
}

/// Signed distance from the camera to the map plane.
pub fn camera_distance(camera: &Camera, map: &Transform) -> f64 {
    map.plane().signed_distance(camera.position())
}

/// Point where `camera`'s view through `v` meets the map plane.
pub fn plane_point_at(camera: &Camera, map: &Transform, v: ViewportPoint) -> Option<DVec3> {
    let ray = camera.viewport_ray(v)?;
    let t = map.plane().intersect(&ray)?;
    Some(ray.at(t))
}

/// Where the view axis meets the map plane, falling back to the camera's
/// foot point when it looks away from the map.
pub fn view_center_on_plane(camera: &Camera, map: &Transform) -> DVec3 {
    let plane = map.plane();
    Ray::new(camera.position(), camera.forward())
        .and_then(|ray| plane.intersect(&ray).map(|t| ray.at(t)))
        .unwrap_or_else(|| plane.project(camera.position()))
}

/// World height visible at the map plane.
pub fn visible_height(camera: &Camera, map: &Transform) -> f64 {
    camera.half_extents_at(camera_distance(camera, map).abs()).y * 2.0
}

/// Viewport shift along one axis that brings `[min, max]` back within the
/// allowed range. Positive values move the map toward the top/right.
fn axis_shift(min: f64, max: f64, fit: bool, limit: f64) -> f64 {
    if fit {
        if max - min >= 1.0 {
            if min > 0.0 {
                -min
            } else if max < 1.0 {
                1.0 - max
            } else {
                0.0
            }
        } else {
            0.5 - (min + max) * 0.5
        }
    } else if max < limit {
        limit - max
    } else if min > 1.0 - limit {
        1.0 - limit - min
    } else {
        0.0
    }
}

/// Camera translation that keeps the map inside the configured bounds, or
/// `None` when no correction is needed (or the map is not fully in front of
/// the camera).
pub fn bounds_correction(
    camera: &Camera,
    map: &Transform,
    config: &NavigationConfig,
) -> Option<DVec3> {
    let rect = map_viewport_rect(camera, map)?;
    let limit = config.letterbox_limit.clamp(0.0, 1.0);
    let shift = DVec2::new(
        axis_shift(rect.min.x, rect.max.x, config.fit_width, limit),
        axis_shift(rect.min.y, rect.max.y, config.fit_height, limit),
    );
    if shift.abs().max_element() < 1e-12 {
        return None;
    }
    let here = plane_point_at(camera, map, ViewportPoint::CENTER)?;
    let there = plane_point_at(camera, map, ViewportPoint(ViewportPoint::CENTER.0 + shift))?;
    // Moving the camera against the content shift slides the map by `shift`.
    Some(here - there)
}
