//! The map engine: owns the loaded world, the cameras, the render target and
//! navigation, and runs them once per frame.
//!
//! Frame order:
//! 1. frame guard (a second call in the same frame is a no-op)
//! 2. offscreen framing sync
//! 3. pointer resolution (touch, ray, viewport center or screen pointer)
//! 4. projection to map-local coordinates and hit-testing when the pointer
//!    or the view changed, with enter/exit events
//! 5. navigation
//! 6. click dispatch

use std::path::Path;

use formats::{MapData, load_world, load_world_from_path};
use foundation::bounds::PixelRect;
use foundation::math::{DVec3, LocalPoint, Ray, ScreenPoint};
use foundation::time::Time;
use navigation::{
    FlyZoom, FrameInput, InputSource, NavView, NavigationController, NavigationMode,
    NavigationOutput, PointerFrame, TouchTracker, key_pan_direction,
};
use runtime::{Event, EventBus, Frame, FrameGuard, MapEvent, Metrics};
use scene::components::Transform;
use scene::{HighlightTracker, MapHit, MapWorld, hit_test};
use tracing::{debug, info};
use viewport::{
    Bounds, Camera, ColliderId, ConfigureOutcome, PointerProjector, PointerSource, QuadCollider,
    ViewportResolver, ViewportTarget, fit_camera_to_map,
};

use crate::calculator::DistanceCalculator;
use crate::config::{EngineConfig, MapSpaceConfig};
use crate::error::EngineError;
use crate::subsystems::{Subsystem, Subsystems};

/// Counter names recorded by the engine.
pub mod counters {
    pub const FRAMES: &str = "engine.frames";
    pub const REPEATED_UPDATES: &str = "engine.repeated_updates";
    pub const HIT_TESTS: &str = "engine.hit_tests";
    pub const CLICKS: &str = "engine.clicks";
    /// Gauge: countries in the loaded world.
    pub const LOADED_COUNTRIES: &str = "engine.loaded_countries";
}

/// Supplies a world-space pointer ray each frame (tracked controllers,
/// gaze).
pub type RayProvider = Box<dyn Fn() -> Option<Ray>>;

pub struct MapEngine {
    config: EngineConfig,
    world: MapWorld,
    map: Transform,
    main_camera: Camera,
    resolver: ViewportResolver,
    occluders: Vec<QuadCollider>,
    navigation: NavigationController,
    touches: TouchTracker,
    highlight: HighlightTracker,
    last_clicked: MapHit,
    /// Local point the current highlight was computed for.
    hover: Option<LocalPoint>,
    hit_dirty: bool,
    /// A ray-driven primary press is waiting for its release.
    ray_press: bool,
    ray_provider: Option<RayProvider>,
    events: EventBus,
    metrics: Metrics,
    guard: FrameGuard,
    frame_index: u64,
    now: Time,
    subsystems: Subsystems,
}

/// Unit map quad scaled to the configured size, facing +Z at the origin.
pub fn map_transform(space: &MapSpaceConfig) -> Transform {
    Transform::identity().with_scale(DVec3::new(space.width, space.height, 1.0))
}

impl MapEngine {
    /// Engine with an empty world, the map rendered directly and the main
    /// camera framing the whole map over `screen`.
    pub fn new(config: EngineConfig, screen: PixelRect) -> Self {
        let map = map_transform(&config.map);
        let mut main_camera = Camera::new(Transform::identity(), config.projection, screen);
        fit_camera_to_map(&mut main_camera, &map);
        Self {
            navigation: NavigationController::new(config.navigation.clone()),
            resolver: ViewportResolver::new(config.viewport),
            config,
            world: MapWorld::new(),
            map,
            main_camera,
            occluders: Vec::new(),
            touches: TouchTracker::new(),
            highlight: HighlightTracker::new(),
            last_clicked: MapHit::NONE,
            hover: None,
            hit_dirty: true,
            ray_press: false,
            ray_provider: None,
            events: EventBus::new(),
            metrics: Metrics::new(),
            guard: FrameGuard::new(),
            frame_index: 0,
            now: Time::ZERO,
            subsystems: Subsystems::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &MapWorld {
        &self.world
    }

    /// Mutable world access; the next frame re-runs the hit-test.
    pub fn world_mut(&mut self) -> &mut MapWorld {
        self.hit_dirty = true;
        &mut self.world
    }

    pub fn map_transform(&self) -> &Transform {
        &self.map
    }

    pub fn main_camera(&self) -> &Camera {
        &self.main_camera
    }

    /// Moves the host's main camera (e.g. a proxy overlay follows it).
    pub fn set_main_camera_transform(&mut self, transform: Transform) {
        self.main_camera.transform = transform;
        self.hit_dirty = true;
    }

    pub fn resolver(&self) -> &ViewportResolver {
        &self.resolver
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn navigation_mode(&self) -> NavigationMode {
        self.navigation.mode()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// What the pointer is over, as of the last hit-test.
    pub fn highlight(&self) -> MapHit {
        self.highlight.current()
    }

    pub fn last_clicked(&self) -> MapHit {
        self.last_clicked
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // ── Map loading ─────────────────────────────────────────────────────

    /// Replaces the world. Highlight and click state are dropped silently
    /// since their indices refer to the old map.
    pub fn load_map(&mut self, world: MapWorld) {
        info!(
            countries = world.countries().len(),
            provinces = world.provinces().len(),
            cities = world.cities().len(),
            "map loaded"
        );
        self.metrics
            .set_gauge(counters::LOADED_COUNTRIES, world.countries().len() as i64);
        self.world = world;
        self.highlight.reset();
        self.last_clicked = MapHit::NONE;
        self.hover = None;
        self.hit_dirty = true;
        self.ray_press = false;
        self.reset_navigation();
        self.subsystems.on_map_reloaded(&self.world);
    }

    pub fn load_map_data(&mut self, data: &MapData) -> Result<(), EngineError> {
        let world = load_world(data)?;
        self.load_map(world);
        Ok(())
    }

    pub fn load_map_from_path(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let world = load_world_from_path(path)?;
        self.load_map(world);
        Ok(())
    }

    pub fn set_country_hidden(&mut self, name: &str, hidden: bool) -> Result<(), EngineError> {
        let index = self.country_index(name)?;
        self.world.set_country_hidden(index, hidden)?;
        self.hit_dirty = true;
        Ok(())
    }

    // ── Display target ──────────────────────────────────────────────────

    /// Switches where the map is displayed. A rebuild abandons any drag or
    /// flight in progress since it was driving the previous camera; an
    /// unchanged target has no effect at all.
    pub fn set_render_target(&mut self, target: ViewportTarget) -> ConfigureOutcome {
        let outcome = self.resolver.configure(target, &self.map);
        match outcome {
            ConfigureOutcome::Ignored | ConfigureOutcome::Unchanged => return outcome,
            ConfigureOutcome::Rebuilt => self.reset_navigation(),
            ConfigureOutcome::Retargeted => {}
        }
        self.resolver.sync_framing(&self.main_camera);
        self.hit_dirty = true;
        outcome
    }

    pub fn set_render_target_screen_rect(&mut self, rect: PixelRect) {
        self.resolver.set_target_screen_rect(rect);
        self.resolver.sync_framing(&self.main_camera);
        self.hit_dirty = true;
    }

    /// The host surface was resized.
    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.main_camera
            .set_pixel_rect(PixelRect::from_size(width, height));
        self.resolver.sync_framing(&self.main_camera);
        self.hit_dirty = true;
    }

    /// Registers a scene quad that blocks pointer rays in front of the map.
    pub fn add_occluder(&mut self, transform: Transform) -> ColliderId {
        let id = ColliderId(ColliderId::FIRST_OCCLUDER + self.occluders.len() as u32);
        self.occluders.push(QuadCollider::new(id, transform));
        self.hit_dirty = true;
        id
    }

    pub fn clear_occluders(&mut self) {
        self.occluders.clear();
        self.hit_dirty = true;
    }

    pub fn set_ray_provider(&mut self, provider: impl Fn() -> Option<Ray> + 'static) {
        self.ray_provider = Some(Box::new(provider));
    }

    pub fn clear_ray_provider(&mut self) {
        self.ray_provider = None;
        self.ray_press = false;
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Map-local point under a screen pixel, if it lands on the visible map.
    pub fn local_hit_from_screen(&self, p: ScreenPoint) -> Option<LocalPoint> {
        self.projector()
            .project(PointerSource::Screen(p), Bounds::Map)
    }

    pub fn local_hit_from_ray(&self, ray: &Ray) -> Option<LocalPoint> {
        self.projector().project_ray(ray, Bounds::Map)
    }

    pub fn local_hit_at_viewport_center(&self) -> Option<LocalPoint> {
        self.projector()
            .project(PointerSource::ViewportCenter, Bounds::Map)
    }

    /// Country, province and city at a map-local point.
    pub fn hit_test(&mut self, p: LocalPoint) -> MapHit {
        self.metrics.inc(counters::HIT_TESTS);
        hit_test(&self.world, p, &self.config.hit_test, &mut self.metrics)
    }

    // ── Fly-to ──────────────────────────────────────────────────────────

    pub fn fly_to_local_point(&mut self, target: LocalPoint, duration: f64, zoom: FlyZoom) {
        let now = self.now;
        let events = self.with_view(|nav, view| nav.fly_to(view, target, duration, zoom, now));
        self.events.extend(self.frame_index, events);
        self.view_changed();
    }

    pub fn fly_to_country(
        &mut self,
        name: &str,
        duration: f64,
        zoom: FlyZoom,
    ) -> Result<(), EngineError> {
        let index = self.country_index(name)?;
        let center = self.world.countries()[index].center;
        self.fly_to_local_point(center, duration, zoom);
        Ok(())
    }

    pub fn fly_to_province(
        &mut self,
        country: &str,
        province: &str,
        duration: f64,
        zoom: FlyZoom,
    ) -> Result<(), EngineError> {
        let owner = self.country_index(country)?;
        let index = self.world.province_index(owner, province).ok_or_else(|| {
            EngineError::UnknownProvince {
                country: country.to_string(),
                province: province.to_string(),
            }
        })?;
        let center = self.world.provinces()[index].center;
        self.fly_to_local_point(center, duration, zoom);
        Ok(())
    }

    /// Flies to a city, optionally disambiguated by its country.
    pub fn fly_to_city(
        &mut self,
        name: &str,
        country: Option<&str>,
        duration: f64,
        zoom: FlyZoom,
    ) -> Result<(), EngineError> {
        let owner = country.map(|c| self.country_index(c)).transpose()?;
        let index = self
            .world
            .city_index(name, owner)
            .ok_or_else(|| EngineError::UnknownCity(name.to_string()))?;
        let position = self.world.cities()[index].position;
        self.fly_to_local_point(position, duration, zoom);
        Ok(())
    }

    /// Snaps back to the whole map, centered.
    pub fn center_map(&mut self) {
        self.fly_to_local_point(LocalPoint::ORIGIN, 0.0, FlyZoom::Level(1.0));
    }

    // ── Subsystems ──────────────────────────────────────────────────────

    /// The engine's instance of `T`, created on first access.
    pub fn subsystem<T: Subsystem + Default>(&mut self) -> Result<&mut T, EngineError> {
        self.subsystems
            .get_or_init(T::default)
            .ok_or(EngineError::Subsystem(std::any::type_name::<T>()))
    }

    pub fn subsystem_count(&self) -> usize {
        self.subsystems.len()
    }

    /// Great-circle distance between two cities, in kilometers.
    pub fn distance_between_cities(&mut self, a: &str, b: &str) -> Result<f64, EngineError> {
        let world = &self.world;
        self.subsystems
            .get_or_init(DistanceCalculator::new)
            .ok_or(EngineError::Subsystem("distance calculator"))?
            .city_distance_by_name(world, a, b)
    }

    /// Shuts subsystems down and releases the offscreen target. The engine
    /// stays usable and renders directly afterwards.
    pub fn shutdown(&mut self) {
        self.subsystems.shutdown();
        self.resolver.teardown();
        debug!("map engine shut down");
    }

    // ── Per frame ───────────────────────────────────────────────────────

    /// Runs one frame. Returns `false` when this frame was already
    /// processed.
    pub fn update(&mut self, frame: Frame, input: &dyn InputSource) -> bool {
        if !self.guard.enter(frame) {
            self.metrics.inc(counters::REPEATED_UPDATES);
            return false;
        }
        self.metrics.inc(counters::FRAMES);
        self.frame_index = frame.index;
        self.now = frame.time;
        self.resolver.sync_framing(&self.main_camera);

        let pointer = self.touches.resolve(input);
        let source = self.pointer_source(input, &pointer);
        let local = source.and_then(|s| self.projector().project(s, Bounds::Map));
        self.refresh_highlight(local);

        let frame_input = FrameInput {
            pointer,
            pan: key_pan_direction(input),
            over_map: local.is_some(),
            screen: self.display_rect(),
            dt_s: frame.dt_s,
            time: frame.time,
        };
        let out = self.navigate(&frame_input);
        self.events.extend(frame.index, out.events);
        if out.moved {
            self.view_changed();
        }

        let ray_click = self.track_ray_click(&pointer, source);
        if out.clicked || ray_click {
            self.click();
        }
        true
    }

    fn pointer_source(&self, input: &dyn InputSource, pointer: &PointerFrame) -> Option<PointerSource> {
        if self.config.pointer_at_viewport_center {
            return Some(PointerSource::ViewportCenter);
        }
        let ray = input
            .pointer_ray()
            .or_else(|| self.ray_provider.as_ref().and_then(|provide| provide()));
        match ray {
            Some(ray) => Some(PointerSource::Ray(ray)),
            None => pointer.position.map(PointerSource::Screen),
        }
    }

    fn refresh_highlight(&mut self, local: Option<LocalPoint>) {
        if !self.hit_dirty && local == self.hover {
            return;
        }
        self.hover = local;
        self.hit_dirty = false;
        let hit = match local {
            Some(p) => self.hit_test(p),
            None => MapHit::NONE,
        };
        let events = self.highlight.update(hit);
        self.events.extend(self.frame_index, events);
    }

    fn click(&mut self) {
        self.metrics.inc(counters::CLICKS);
        self.last_clicked = self.highlight.current();
        let events = self.highlight.click_events();
        self.events.extend(self.frame_index, events);
    }

    /// Press/release pairs of a ray pointer; screen pointers are handled by
    /// navigation's click detection.
    fn track_ray_click(&mut self, pointer: &PointerFrame, source: Option<PointerSource>) -> bool {
        if pointer.position.is_some() || !matches!(source, Some(PointerSource::Ray(_))) {
            self.ray_press = false;
            return false;
        }
        if pointer.primary.pressed {
            self.ray_press = true;
        }
        pointer.primary.released && std::mem::take(&mut self.ray_press)
    }

    fn navigate(&mut self, input: &FrameInput) -> NavigationOutput {
        let mut camera = self.nav_camera();
        let mut map = self.map;
        let base = PointerProjector::new(
            &self.resolver,
            &self.main_camera,
            &self.map,
            &self.occluders,
        );
        let out = self
            .navigation
            .update(&mut NavView::new(&mut camera, &mut map), base, input);
        self.store_nav_camera(camera);
        self.map = map;
        out
    }

    fn with_view<R>(
        &mut self,
        f: impl FnOnce(&mut NavigationController, &mut NavView<'_>) -> R,
    ) -> R {
        let mut camera = self.nav_camera();
        let mut map = self.map;
        let result = f(&mut self.navigation, &mut NavView::new(&mut camera, &mut map));
        self.store_nav_camera(camera);
        self.map = map;
        result
    }

    /// The camera navigation drives: the main camera when rendering
    /// directly, the dedicated offscreen camera otherwise.
    fn nav_camera(&self) -> Camera {
        match (self.resolver.target(), self.resolver.offscreen_camera()) {
            (ViewportTarget::None, _) | (_, None) => self.main_camera,
            (_, Some(camera)) => *camera,
        }
    }

    fn store_nav_camera(&mut self, camera: Camera) {
        if *self.resolver.target() == ViewportTarget::None {
            self.main_camera = camera;
        } else if let Some(offscreen) = self.resolver.offscreen_camera_mut() {
            *offscreen = camera;
        } else {
            self.main_camera = camera;
        }
    }

    /// Pixel rect the map is displayed in, for drag and edge-scroll scaling.
    fn display_rect(&self) -> PixelRect {
        match self.resolver.target() {
            ViewportTarget::UiPanel(panel) => panel.screen_rect,
            _ => self.main_camera.pixel_rect(),
        }
    }

    fn view_changed(&mut self) {
        self.resolver.invalidate_framing();
        self.resolver.sync_framing(&self.main_camera);
        self.hit_dirty = true;
    }

    fn reset_navigation(&mut self) {
        if self.navigation.is_dragging() {
            self.events.emit_at(self.frame_index, MapEvent::DragEnd);
        }
        self.navigation.reset();
    }

    fn projector(&self) -> PointerProjector<'_> {
        PointerProjector::new(&self.resolver, &self.main_camera, &self.map, &self.occluders)
    }

    fn country_index(&self, name: &str) -> Result<usize, EngineError> {
        self.world
            .country_index(name)
            .ok_or_else(|| EngineError::UnknownCountry(name.to_string()))
    }
}

impl Drop for MapEngine {
    fn drop(&mut self) {
        self.subsystems.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::DVec2;
    use navigation::{InputState, MouseButton};
    use scene::Region;

    fn square(half: f64, cx: f64, cy: f64) -> Region {
        Region::new(vec![
            DVec2::new(cx - half, cy - half),
            DVec2::new(cx + half, cy - half),
            DVec2::new(cx + half, cy + half),
            DVec2::new(cx - half, cy + half),
        ])
    }

    fn engine() -> MapEngine {
        let mut world = MapWorld::new();
        world
            .add_country("Middle", "Nowhere", vec![square(0.2, 0.0, 0.0)])
            .unwrap();
        let mut engine = MapEngine::new(EngineConfig::default(), PixelRect::from_size(800.0, 400.0));
        engine.load_map(world);
        engine
    }

    fn close(a: LocalPoint, b: LocalPoint) -> bool {
        a.distance_squared(b) < 1e-12
    }

    #[test]
    fn starts_framed_on_the_whole_map() {
        let engine = engine();
        let center = engine.local_hit_from_screen(ScreenPoint::new(400.0, 200.0)).unwrap();
        assert!(close(center, LocalPoint::ORIGIN));
        let quarter = engine.local_hit_from_screen(ScreenPoint::new(200.0, 100.0)).unwrap();
        assert!(close(quarter, LocalPoint::new(-0.25, -0.25)));
        assert!(close(engine.local_hit_at_viewport_center().unwrap(), LocalPoint::ORIGIN));
    }

    #[test]
    fn second_update_in_a_frame_is_ignored() {
        let mut engine = engine();
        let input = InputState::new();
        let frame = Frame::new(0, 1.0 / 60.0);
        assert!(engine.update(frame, &input));
        assert!(!engine.update(frame, &input));
        assert!(engine.update(frame.next(), &input));
        assert_eq!(engine.metrics().counter(counters::FRAMES), 2);
        assert_eq!(engine.metrics().counter(counters::REPEATED_UPDATES), 1);
    }

    #[test]
    fn hover_runs_the_hit_test_only_when_something_changed() {
        let mut engine = engine();
        let mut input = InputState::new();
        input.move_to(400.0, 200.0);
        let mut frame = Frame::new(0, 1.0 / 60.0);
        for _ in 0..5 {
            engine.update(frame, &input);
            frame = frame.next();
        }
        assert_eq!(engine.highlight().country.map(|c| c.entity), Some(0));
        // First frame plus the re-test after the first observed view.
        assert_eq!(engine.metrics().counter(counters::HIT_TESTS), 2);
    }

    #[test]
    fn hidden_countries_are_not_hit() {
        let mut engine = engine();
        engine.set_country_hidden("Middle", true).unwrap();
        assert!(engine.hit_test(LocalPoint::ORIGIN).country.is_none());
        assert!(matches!(
            engine.set_country_hidden("Atlantis", true),
            Err(EngineError::UnknownCountry(_))
        ));
    }

    #[test]
    fn ray_press_and_release_clicks() {
        let mut engine = engine();
        let ray = Ray::new(DVec3::new(0.0, 0.0, 50.0), DVec3::NEG_Z).unwrap();
        let mut input = InputState::new();
        input.ray = Some(ray);
        let mut frame = Frame::new(0, 1.0 / 60.0);

        engine.update(frame, &input);
        input.press(MouseButton::Primary);
        frame = frame.next();
        engine.update(frame, &input);
        input.end_frame();
        input.release(MouseButton::Primary);
        frame = frame.next();
        engine.update(frame, &input);

        assert_eq!(engine.last_clicked().country.map(|c| c.entity), Some(0));
        let clicks = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e.kind, MapEvent::CountryClick { .. }))
            .count();
        assert_eq!(clicks, 1);
    }

    #[test]
    fn center_map_restores_the_framing() {
        let mut engine = engine();
        engine.fly_to_local_point(LocalPoint::new(0.3, 0.2), 0.0, FlyZoom::Level(0.5));
        let moved = engine.local_hit_at_viewport_center().unwrap();
        assert!(close(moved, LocalPoint::new(0.3, 0.2)));
        engine.center_map();
        let center = engine.local_hit_at_viewport_center().unwrap();
        assert!(close(center, LocalPoint::ORIGIN));
    }

    #[test]
    fn unknown_fly_to_targets_are_errors() {
        let mut engine = engine();
        assert!(matches!(
            engine.fly_to_country("Atlantis", 0.0, FlyZoom::Keep),
            Err(EngineError::UnknownCountry(_))
        ));
        assert!(matches!(
            engine.fly_to_province("Middle", "Nowhere", 0.0, FlyZoom::Keep),
            Err(EngineError::UnknownProvince { .. })
        ));
        assert!(matches!(
            engine.fly_to_city("Nowhere", None, 0.0, FlyZoom::Keep),
            Err(EngineError::UnknownCity(_))
        ));
    }

    #[test]
    fn occluders_get_ids_after_the_reserved_ones() {
        let mut engine = engine();
        let a = engine.add_occluder(Transform::translate(DVec3::new(0.0, 0.0, 10.0)));
        let b = engine.add_occluder(Transform::translate(DVec3::new(0.0, 0.0, 20.0)));
        assert_eq!(a, ColliderId(ColliderId::FIRST_OCCLUDER));
        assert_eq!(b, ColliderId(ColliderId::FIRST_OCCLUDER + 1));
    }
}
