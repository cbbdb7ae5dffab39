//! Pointer projection: from a pointer (pixel, viewport center or ray) to the
//! map-local point it designates, whatever surface currently shows the map.

use foundation::math::{DVec2, LocalPoint, Ray, ScreenPoint, ViewportPoint};
use scene::components::Transform;

use crate::camera::Camera;
use crate::collider::{ColliderId, QuadCollider, raycast_nearest};
use crate::render_target::{RenderTexture, ViewportTarget};
use crate::resolver::{ViewportResolver, map_viewport_rect};

/// Tolerance for points on the edge of the map's viewport sub-rect.
const EDGE_SLACK: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerSource {
    Screen(ScreenPoint),
    /// Center of the main camera (or of the UI panel).
    ViewportCenter,
    /// Externally supplied ray, e.g. from a tracked controller.
    Ray(Ray),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bounds {
    /// Only points on the visible map; the normal mode for hit-testing.
    Map,
    /// Keep extrapolating past the map edges, so drags and zooms anchored on
    /// the plane keep working when the pointer leaves the map.
    Unbounded,
}

/// Borrowed view of everything a projection needs.
#[derive(Debug, Copy, Clone)]
pub struct PointerProjector<'a> {
    pub main_camera: &'a Camera,
    pub map: &'a Transform,
    pub target: &'a ViewportTarget,
    pub offscreen_camera: Option<&'a Camera>,
    pub texture: Option<RenderTexture>,
    pub occluders: &'a [QuadCollider],
}

impl<'a> PointerProjector<'a> {
    pub fn new(
        resolver: &'a ViewportResolver,
        main_camera: &'a Camera,
        map: &'a Transform,
        occluders: &'a [QuadCollider],
    ) -> Self {
        Self {
            main_camera,
            map,
            target: resolver.target(),
            offscreen_camera: resolver.offscreen_camera(),
            texture: resolver.texture(),
            occluders,
        }
    }

    /// Same projector with the navigable pose swapped in: `map`, plus the
    /// camera that navigation moves (the main camera in direct mode, the
    /// offscreen camera otherwise).
    pub fn with_pose(self, camera: &'a Camera, map: &'a Transform) -> Self {
        match self.target {
            ViewportTarget::None => Self {
                main_camera: camera,
                map,
                ..self
            },
            _ => Self {
                offscreen_camera: Some(camera),
                map,
                ..self
            },
        }
    }

    /// Map-local point under `source`, or `None` when nothing valid is there
    /// (camera or texture not ready, ray blocked or off target, outside the
    /// map with `Bounds::Map`).
    pub fn project(&self, source: PointerSource, bounds: Bounds) -> Option<LocalPoint> {
        match self.target {
            ViewportTarget::UiPanel(panel) => {
                let p = match source {
                    PointerSource::Screen(p) => p,
                    PointerSource::ViewportCenter => panel.screen_rect.center(),
                    PointerSource::Ray(_) => return None,
                };
                let v = panel.screen_rect.normalize(p)?;
                if bounds == Bounds::Map && !v.is_inside() {
                    return None;
                }
                self.offscreen_to_local(v, bounds)
            }
            ViewportTarget::None | ViewportTarget::Proxy3D(_) => {
                let ray = match source {
                    PointerSource::Screen(p) => self.main_camera.screen_ray(p)?,
                    PointerSource::ViewportCenter => {
                        if !self.main_camera.is_ready() {
                            return None;
                        }
                        self.main_camera.viewport_ray(ViewportPoint::CENTER)?
                    }
                    PointerSource::Ray(ray) => ray,
                };
                self.project_ray(&ray, bounds)
            }
        }
    }

    pub fn project_ray(&self, ray: &Ray, bounds: Bounds) -> Option<LocalPoint> {
        match self.target {
            ViewportTarget::None => match bounds {
                Bounds::Unbounded => ray_map_plane(ray, self.map),
                Bounds::Map => {
                    let hit = raycast_nearest(&self.colliders(), ray)?;
                    (hit.collider == ColliderId::MAP).then_some(hit.local)
                }
            },
            ViewportTarget::Proxy3D(proxy) => {
                let quad = match bounds {
                    Bounds::Unbounded => {
                        QuadCollider::new(ColliderId::PROXY, proxy.transform)
                            .plane_hit(ray)?
                            .1
                    }
                    Bounds::Map => {
                        let hit = raycast_nearest(&self.colliders(), ray)?;
                        if hit.collider != ColliderId::PROXY {
                            return None;
                        }
                        hit.local
                    }
                };
                let uv = quad.0 + DVec2::splat(0.5);
                self.offscreen_to_local(ViewportPoint(uv), bounds)
            }
            ViewportTarget::UiPanel(_) => None,
        }
    }

    /// Everything a pointer ray can hit, map first.
    pub fn colliders(&self) -> Vec<QuadCollider> {
        let mut colliders = Vec::with_capacity(self.occluders.len() + 2);
        colliders.push(QuadCollider::new(ColliderId::MAP, *self.map));
        if let ViewportTarget::Proxy3D(proxy) = self.target {
            colliders.push(QuadCollider::new(ColliderId::PROXY, proxy.transform));
        }
        colliders.extend_from_slice(self.occluders);
        colliders
    }

    fn offscreen_to_local(&self, v: ViewportPoint, bounds: Bounds) -> Option<LocalPoint> {
        if !self.texture.is_some_and(|t| t.is_ready()) {
            return None;
        }
        offscreen_viewport_to_local(self.offscreen_camera?, self.map, v, bounds)
    }
}

/// Intersection of `ray` with the map's infinite plane, in local coordinates.
pub fn ray_map_plane(ray: &Ray, map: &Transform) -> Option<LocalPoint> {
    QuadCollider::new(ColliderId::MAP, *map)
        .plane_hit(ray)
        .map(|(_, local)| local)
}

/// Maps a point of the offscreen camera's viewport to map-local coordinates
/// through the sub-rectangle the map occupies in that viewport.
pub fn offscreen_viewport_to_local(
    camera: &Camera,
    map: &Transform,
    v: ViewportPoint,
    bounds: Bounds,
) -> Option<LocalPoint> {
    let rect = map_viewport_rect(camera, map)?;
    let inside = v.0.cmpge(rect.min - DVec2::splat(EDGE_SLACK)).all()
        && v.0.cmple(rect.max + DVec2::splat(EDGE_SLACK)).all();
    if bounds == Bounds::Map && !inside {
        return None;
    }
    let t = (v.0 - rect.min) / rect.size();
    Some(LocalPoint(t - DVec2::splat(0.5)))
}
