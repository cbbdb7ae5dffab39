use foundation::bounds::{PixelRect, Rect};
use foundation::math::{DVec3, LocalPoint, MAP_LOCAL_CORNERS, ScreenPoint};
use scene::components::Transform;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::camera::{Camera, Projection};
use crate::render_target::{RenderTexture, TargetMode, TextureId, ViewportTarget};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Offscreen texture resolution.
    pub texture_width: u32,
    pub texture_height: u32,
    /// Projection of the dedicated offscreen camera.
    pub offscreen_projection: Projection,
    /// Distance in front of the main camera at which screen-space proxy
    /// overlays are placed.
    pub overlay_distance: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            texture_width: 2048,
            texture_height: 1024,
            offscreen_projection: Projection::default(),
            overlay_distance: 10.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// The target lacks a surface; nothing changed.
    Ignored,
    /// Same target as before.
    Unchanged,
    /// Same texture, different target object.
    Retargeted,
    /// The offscreen texture was (re)created or torn down.
    Rebuilt,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ResolverStats {
    pub textures_created: u64,
    pub textures_destroyed: u64,
    pub cameras_created: u64,
    pub framing_syncs: u64,
}

/// Inputs the framing depends on; equal keys mean nothing to do.
#[derive(Debug, Copy, Clone, PartialEq)]
struct FramingKey {
    target: ViewportTarget,
    overlay_rect: Option<PixelRect>,
    main_transform: Transform,
    main_projection: Projection,
    main_rect: PixelRect,
    texture: Option<RenderTexture>,
}

/// Owns the offscreen texture and the dedicated camera used when the map is
/// shown on a proxy object or a UI panel, and keeps their framing in sync
/// with the target's shape.
#[derive(Debug)]
pub struct ViewportResolver {
    config: ViewportConfig,
    target: ViewportTarget,
    texture: Option<RenderTexture>,
    camera: Option<Camera>,
    overlay_rect: Option<PixelRect>,
    framing: Option<FramingKey>,
    next_texture: u64,
    stats: ResolverStats,
}

impl ViewportResolver {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            target: ViewportTarget::None,
            texture: None,
            camera: None,
            overlay_rect: None,
            framing: None,
            next_texture: 1,
            stats: ResolverStats::default(),
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn target(&self) -> &ViewportTarget {
        &self.target
    }

    pub fn mode(&self) -> TargetMode {
        self.target.mode()
    }

    pub fn texture(&self) -> Option<RenderTexture> {
        self.texture
    }

    pub fn offscreen_camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn offscreen_camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Switches the display target.
    ///
    /// Direct mode releases the offscreen texture. Indirect modes allocate a
    /// texture when none exists or when the mode or resolution changed, and
    /// create the dedicated camera once, framed on `map`.
    pub fn configure(&mut self, target: ViewportTarget, map: &Transform) -> ConfigureOutcome {
        let mode = target.mode();
        if !target.has_surface() {
            warn!(?mode, "render target has no displayable surface; ignoring");
            return ConfigureOutcome::Ignored;
        }

        if mode == TargetMode::Direct {
            if self.target == ViewportTarget::None && self.texture.is_none() {
                return ConfigureOutcome::Unchanged;
            }
            self.release_texture();
            self.target = ViewportTarget::None;
            self.framing = None;
            info!("rendering map directly");
            return ConfigureOutcome::Rebuilt;
        }

        let (w, h) = (self.config.texture_width, self.config.texture_height);
        let rebuild = self.target.mode() != mode
            || self
                .texture
                .is_none_or(|t| (t.width, t.height) != (w, h));
        if rebuild {
            self.release_texture();
            let texture = self.allocate_texture(w, h);
            match self.camera.as_mut() {
                Some(camera) => camera.set_pixel_rect(texture.pixel_rect()),
                None => {
                    let mut camera = Camera::new(
                        Transform::identity(),
                        self.config.offscreen_projection,
                        texture.pixel_rect(),
                    );
                    fit_camera_to_map(&mut camera, map);
                    self.camera = Some(camera);
                    self.stats.cameras_created += 1;
                }
            }
        }

        let mut target = target;
        target.assign_texture(self.texture.map(|t| t.id));
        let outcome = if rebuild {
            info!(?mode, width = w, height = h, "offscreen render target rebuilt");
            ConfigureOutcome::Rebuilt
        } else if target != self.target {
            ConfigureOutcome::Retargeted
        } else {
            ConfigureOutcome::Unchanged
        };
        self.target = target;
        self.framing = None;
        outcome
    }

    /// Screen rect of the UI panel, or of the overlay area for screen-space
    /// proxies.
    pub fn set_target_screen_rect(&mut self, rect: PixelRect) {
        match &mut self.target {
            ViewportTarget::UiPanel(panel) => panel.screen_rect = rect,
            ViewportTarget::Proxy3D(_) | ViewportTarget::None => self.overlay_rect = Some(rect),
        }
        self.framing = None;
    }

    /// Matches the dedicated camera to the target's shape and, for overlay
    /// proxies, glues the proxy in front of `main`.
    ///
    /// Returns `false` without touching anything when no input changed since
    /// the previous call.
    pub fn sync_framing(&mut self, main: &Camera) -> bool {
        if self.framing == Some(self.framing_key(main)) {
            return false;
        }

        let aspect = match &mut self.target {
            ViewportTarget::None => None,
            ViewportTarget::Proxy3D(proxy) => {
                if proxy.screen_space_overlay {
                    let rect = self.overlay_rect.unwrap_or(main.pixel_rect());
                    if let Some(t) = overlay_transform(main, rect, self.config.overlay_distance) {
                        proxy.transform = t;
                    }
                }
                let size = proxy.transform.plane_size();
                Some(size.x / size.y)
            }
            ViewportTarget::UiPanel(panel) => Some(panel.screen_rect.aspect()),
        };
        if let (Some(aspect), Some(camera)) = (aspect, self.camera.as_mut()) {
            camera.set_aspect(aspect);
            debug!(aspect = camera.aspect(), "offscreen camera reframed");
        }

        self.framing = Some(self.framing_key(main));
        self.stats.framing_syncs += 1;
        true
    }

    /// Forces the next `sync_framing` to run.
    pub fn invalidate_framing(&mut self) {
        self.framing = None;
    }

    /// Sub-rectangle of the offscreen viewport covered by the map.
    pub fn map_viewport_rect(&self, map: &Transform) -> Option<Rect> {
        map_viewport_rect(self.camera.as_ref()?, map)
    }

    /// Releases the texture and forgets the target; the camera is kept.
    pub fn teardown(&mut self) {
        self.release_texture();
        self.target = ViewportTarget::None;
        self.overlay_rect = None;
        self.framing = None;
    }

    fn framing_key(&self, main: &Camera) -> FramingKey {
        FramingKey {
            target: self.target,
            overlay_rect: self.overlay_rect,
            main_transform: main.transform,
            main_projection: main.projection,
            main_rect: main.pixel_rect(),
            texture: self.texture,
        }
    }

    fn allocate_texture(&mut self, width: u32, height: u32) -> RenderTexture {
        let texture = RenderTexture {
            id: TextureId(self.next_texture),
            width,
            height,
        };
        self.next_texture += 1;
        self.stats.textures_created += 1;
        self.texture = Some(texture);
        texture
    }

    fn release_texture(&mut self) {
        if let Some(texture) = self.texture.take() {
            debug!(id = texture.id.0, "offscreen texture released");
            self.stats.textures_destroyed += 1;
        }
    }
}

/// Points `camera` at `map` head-on with the map filling the view height.
pub fn fit_camera_to_map(camera: &mut Camera, map: &Transform) {
    let height = map.plane_size().y;
    if let Projection::Orthographic { .. } = camera.projection {
        camera.set_ortho_size(height * 0.5);
    }
    let distance = camera.fit_distance(height);
    camera.transform.rotation = map.rotation;
    camera.transform.position = map.position + map.normal() * distance;
}

/// Bounding rect of the projected map corners in `camera`'s viewport.
pub fn map_viewport_rect(camera: &Camera, map: &Transform) -> Option<Rect> {
    let mut rect = Rect::EMPTY;
    for corner in MAP_LOCAL_CORNERS {
        let v = camera.world_to_viewport(map.local_to_world(LocalPoint(corner)))?;
        rect = rect.include(v.0);
    }
    let size = rect.size();
    if size.x > 0.0 && size.y > 0.0 {
        Some(rect)
    } else {
        None
    }
}

/// Transform of a quad facing `main` that exactly covers `rect` at `distance`.
pub fn overlay_transform(main: &Camera, rect: PixelRect, distance: f64) -> Option<Transform> {
    if !main.is_ready() || rect.is_empty() {
        return None;
    }
    let screen = main.pixel_rect();
    let v0 = screen.normalize(ScreenPoint::new(rect.x, rect.y))?;
    let v1 = screen.normalize(ScreenPoint::new(rect.x + rect.width, rect.y + rect.height))?;
    let p0 = main.viewport_to_world(v0, distance).0;
    let p1 = main.viewport_to_world(v1, distance).0;
    let size = main.half_extents_at(distance) * 2.0 * (v1.0 - v0.0);
    Some(Transform {
        position: (p0 + p1) * 0.5,
        rotation: main.transform.rotation,
        scale: DVec3::new(size.x, size.y, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_target::{ProxySurface, UiPanel};
    use foundation::math::{DVec2, WorldPoint};
    use pretty_assertions::assert_eq;

    fn map() -> Transform {
        Transform::identity().with_scale(DVec3::new(200.0, 100.0, 1.0))
    }

    fn main_camera() -> Camera {
        let mut c = Camera::perspective(60.0, PixelRect::from_size(800.0, 400.0));
        fit_camera_to_map(&mut c, &map());
        c
    }

    fn panel(w: f64, h: f64) -> ViewportTarget {
        ViewportTarget::UiPanel(UiPanel::new(PixelRect::new(100.0, 100.0, w, h)))
    }

    #[test]
    fn missing_surface_is_a_no_op() {
        let mut r = ViewportResolver::new(ViewportConfig::default());
        let mut proxy = ProxySurface::new(Transform::identity());
        proxy.has_renderer = false;
        assert_eq!(
            r.configure(ViewportTarget::Proxy3D(proxy), &map()),
            ConfigureOutcome::Ignored
        );
        assert_eq!(r.mode(), TargetMode::Direct);
        assert!(r.texture().is_none());
    }

    #[test]
    fn switching_modes_recreates_the_texture_and_reuses_the_camera() {
        let mut r = ViewportResolver::new(ViewportConfig::default());
        assert_eq!(r.configure(panel(400.0, 200.0), &map()), ConfigureOutcome::Rebuilt);
        let first = r.texture().unwrap();
        assert_eq!((first.width, first.height), (2048, 1024));
        assert_eq!(r.target().assigned_texture(), Some(first.id));

        assert_eq!(r.configure(panel(400.0, 200.0), &map()), ConfigureOutcome::Unchanged);
        assert_eq!(r.configure(panel(300.0, 200.0), &map()), ConfigureOutcome::Retargeted);
        assert_eq!(r.texture(), Some(first));

        let proxy = ViewportTarget::Proxy3D(ProxySurface::new(map()));
        assert_eq!(r.configure(proxy, &map()), ConfigureOutcome::Rebuilt);
        assert_ne!(r.texture().unwrap().id, first.id);

        assert_eq!(r.configure(ViewportTarget::None, &map()), ConfigureOutcome::Rebuilt);
        assert!(r.texture().is_none());
        assert_eq!(
            r.stats(),
            ResolverStats {
                textures_created: 2,
                textures_destroyed: 2,
                cameras_created: 1,
                framing_syncs: 0,
            }
        );
    }

    #[test]
    fn sync_framing_is_idempotent() {
        let mut r = ViewportResolver::new(ViewportConfig::default());
        r.configure(panel(300.0, 100.0), &map());
        let main = main_camera();
        assert!(r.sync_framing(&main));
        assert_eq!(r.offscreen_camera().unwrap().aspect(), 3.0);
        let snapshot = *r.offscreen_camera().unwrap();
        assert!(!r.sync_framing(&main));
        assert_eq!(*r.offscreen_camera().unwrap(), snapshot);

        r.set_target_screen_rect(PixelRect::new(0.0, 0.0, 100.0, 100.0));
        assert!(r.sync_framing(&main));
        assert_eq!(r.offscreen_camera().unwrap().aspect(), 1.0);
    }

    #[test]
    fn overlay_proxy_covers_its_screen_rect() {
        let mut r = ViewportResolver::new(ViewportConfig::default());
        r.configure(ViewportTarget::Proxy3D(ProxySurface::overlay()), &map());
        r.set_target_screen_rect(PixelRect::new(400.0, 0.0, 400.0, 400.0));
        let main = main_camera();
        assert!(r.sync_framing(&main));
        assert!(!r.sync_framing(&main));

        let ViewportTarget::Proxy3D(proxy) = *r.target() else {
            panic!("expected proxy target");
        };
        let position = WorldPoint(proxy.transform.position);
        let center = main.world_to_viewport(position).unwrap();
        assert!((center.0 - DVec2::new(0.75, 0.5)).length() < 1e-9);
        assert!((main.depth_of(position) - 10.0).abs() < 1e-9);
        assert!((r.offscreen_camera().unwrap().aspect() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fitted_camera_sees_the_map_edge_to_edge_vertically() {
        let mut c = Camera::perspective(60.0, PixelRect::from_size(200.0, 100.0));
        fit_camera_to_map(&mut c, &map());
        let rect = map_viewport_rect(&c, &map()).unwrap();
        assert!((rect.min - DVec2::ZERO).length() < 1e-9);
        assert!((rect.max - DVec2::ONE).length() < 1e-9);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ViewportConfig = serde_json::from_str(r#"{"texture_width":512}"#).unwrap();
        assert_eq!(config.texture_width, 512);
        assert_eq!(config.texture_height, 1024);
        assert_eq!(config.overlay_distance, 10.0);
    }
}
