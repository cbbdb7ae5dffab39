//! Per-frame map navigation.
//!
//! Features:
//! - Click versus drag discrimination with drag start/end notifications
//! - Anchored (constant-speed) drags, or direct drags with a damped glide
//! - Eased wheel and pinch zoom toward the cursor, clamped per projection
//! - Keyboard and screen-edge panning
//! - Letterbox or full-bleed boundary clamping
//! - Animated fly-to, optionally interrupted by a drag
//! - Static-camera mode where the map moves instead of the camera

use foundation::bounds::PixelRect;
use foundation::math::{DVec2, DVec3, LocalPoint, ScreenPoint, reject_from};
use foundation::time::Time;
use runtime::MapEvent;
use scene::components::Transform;
use serde::{Deserialize, Serialize};
use tracing::debug;
use viewport::{Bounds, Camera, PointerProjector, PointerSource};

use crate::config::NavigationConfig;
use crate::fly_to::{FlyTo, FlyZoom, Mover};
use crate::input::PointerFrame;
use crate::limits::{
    ZoomLimits, bounds_correction, camera_distance, view_center_on_plane, visible_height,
};

/// Accumulated wheel impulse is capped at this magnitude.
const MAX_ZOOM_ACCEL: f64 = 0.1;
/// The easing tail stops once it decays below this magnitude.
const ZOOM_STOP_THRESHOLD: f64 = 0.005;
/// Per-frame divisor of the wheel impulse when easing out.
const ZOOM_DAMPING: f64 = 1.15;
/// A direct-drag glide lasts this many frames.
const DRAG_DAMPING_FRAMES: u32 = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    #[default]
    Idle,
    Dragging,
    WheelZooming,
    KeyPanning,
    EdgeScrolling,
    FlyingTo,
}

/// The navigable pose: the camera that navigation moves and the map.
pub struct NavView<'a> {
    pub camera: &'a mut Camera,
    pub map: &'a mut Transform,
}

impl<'a> NavView<'a> {
    pub fn new(camera: &'a mut Camera, map: &'a mut Transform) -> Self {
        Self { camera, map }
    }

    /// Applies a camera-space motion; in static mode the map moves the
    /// opposite way instead.
    pub fn translate(&mut self, mover: Mover, delta: DVec3) {
        match mover {
            Mover::Camera => self.camera.transform.position += delta,
            Mover::Map => self.map.position -= delta,
        }
    }

    /// Map-local point under a pixel, extrapolated past the map edges.
    pub fn local_under(&self, base: PointerProjector<'_>, at: ScreenPoint) -> Option<LocalPoint> {
        base.with_pose(&*self.camera, &*self.map)
            .project(PointerSource::Screen(at), Bounds::Unbounded)
    }
}

/// Everything navigation reads for one frame.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FrameInput {
    pub pointer: PointerFrame,
    /// Normalized key pan direction.
    pub pan: DVec2,
    /// The pointer is over the visible, unblocked map.
    pub over_map: bool,
    /// Pixel rect that displays the map.
    pub screen: PixelRect,
    pub dt_s: f64,
    pub time: Time,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationOutput {
    pub events: Vec<MapEvent>,
    /// The camera or the map moved since the previous frame.
    pub moved: bool,
    /// A primary press was released without turning into a drag.
    pub clicked: bool,
    pub secondary_clicked: bool,
}

/// Comparable capture of everything navigation can change.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub camera: Transform,
    pub ortho_size: Option<f64>,
    pub map: Transform,
}

impl ViewSnapshot {
    pub fn capture(view: &NavView<'_>) -> Self {
        Self {
            camera: view.camera.transform,
            ortho_size: view.camera.ortho_size(),
            map: *view.map,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Press {
    origin: ScreenPoint,
    last: ScreenPoint,
    /// Map point grabbed by an anchored drag.
    anchor: Option<LocalPoint>,
    can_drag: bool,
    /// Moved past the click threshold at some point.
    exceeded: bool,
    dragging: bool,
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    config: NavigationConfig,
    mode: NavigationMode,
    press: Option<Press>,
    secondary_origin: Option<ScreenPoint>,
    /// Last direct-drag motion and the glide frame counter.
    glide: DVec3,
    glide_frame: u32,
    zoom_accel: f64,
    fly: Option<FlyTo>,
    last_view: Option<ViewSnapshot>,
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            mode: NavigationMode::Idle,
            press: None,
            secondary_origin: None,
            glide: DVec3::ZERO,
            glide_frame: 0,
            zoom_accel: 0.0,
            fly: None,
            last_view: None,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: NavigationConfig) {
        self.config = config;
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    pub fn is_flying(&self) -> bool {
        self.fly.is_some()
    }

    pub fn fly_target(&self) -> Option<LocalPoint> {
        self.fly.map(|f| f.target)
    }

    pub fn zoom_limits(&self, map: &Transform) -> ZoomLimits {
        ZoomLimits::for_map(&self.config, map)
    }

    fn mover(&self) -> Mover {
        if self.config.static_camera {
            Mover::Map
        } else {
            Mover::Camera
        }
    }

    /// Drops all motion state; the next frame reports the view as moved.
    pub fn reset(&mut self) {
        self.mode = NavigationMode::Idle;
        self.press = None;
        self.secondary_origin = None;
        self.stop_glide();
        self.zoom_accel = 0.0;
        self.fly = None;
        self.last_view = None;
    }

    pub fn cancel_fly_to(&mut self) -> bool {
        let was_flying = self.fly.take().is_some();
        if was_flying {
            self.mode = NavigationMode::Idle;
        }
        was_flying
    }

    /// Starts a flight that brings `target` to the configured anchor of the
    /// view. Non-positive durations move immediately. Returns the events
    /// the call produced (an interrupted drag's end, an immediate arrival).
    pub fn fly_to(
        &mut self,
        view: &mut NavView<'_>,
        target: LocalPoint,
        duration: f64,
        zoom: FlyZoom,
        now: Time,
    ) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if self.press.take().is_some_and(|p| p.dragging) {
            events.push(MapEvent::DragEnd);
        }
        self.stop_glide();
        self.zoom_accel = 0.0;

        let limits = ZoomLimits::for_map(&self.config, view.map);
        let plan = FlyTo::plan(
            view,
            self.mover(),
            target,
            zoom,
            self.config.fly_to_anchor,
            &limits,
            now,
            duration,
        );
        debug!(x = target.x(), y = target.y(), duration, "fly-to started");
        if duration <= 0.0 {
            plan.step(view, now);
            self.fly = None;
            self.mode = NavigationMode::Idle;
            events.push(MapEvent::FlyToEnd);
        } else {
            self.fly = Some(plan);
            self.mode = NavigationMode::FlyingTo;
        }
        events
    }

    /// Runs one frame of navigation. `base` projects pointers for the
    /// current render target; the view's pose is swapped into it as the
    /// view moves.
    pub fn update(
        &mut self,
        view: &mut NavView<'_>,
        base: PointerProjector<'_>,
        input: &FrameInput,
    ) -> NavigationOutput {
        let mut out = NavigationOutput::default();

        if let Some(fly) = self.fly {
            if input.pointer.primary.pressed && self.config.drag_interrupts_fly_to {
                debug!("fly-to interrupted");
                self.fly = None;
            } else {
                if fly.step(view, input.time) {
                    self.fly = None;
                    out.events.push(MapEvent::FlyToEnd);
                    debug!("fly-to finished");
                }
                self.mode = if self.fly.is_some() {
                    NavigationMode::FlyingTo
                } else {
                    NavigationMode::Idle
                };
                out.moved = self.observe(view);
                return out;
            }
        }

        let gliding = self.handle_primary(view, base, input, &mut out);
        self.handle_secondary(view, base, input, &mut out);
        let zooming = self.handle_zoom(view, base, input);
        let key_panning = self.handle_keys(view, input);
        let edge_scrolling = self.handle_edge_scroll(view, input);
        if self.fly.is_none() {
            self.clamp_bounds(view);
        }

        self.mode = if self.fly.is_some() {
            NavigationMode::FlyingTo
        } else if self.is_dragging() || gliding {
            NavigationMode::Dragging
        } else if zooming {
            NavigationMode::WheelZooming
        } else if key_panning {
            NavigationMode::KeyPanning
        } else if edge_scrolling {
            NavigationMode::EdgeScrolling
        } else {
            NavigationMode::Idle
        };
        out.moved = self.observe(view);
        out
    }

    /// Applies the boundary policy; returns whether the view was corrected.
    pub fn clamp_bounds(&self, view: &mut NavView<'_>) -> bool {
        match bounds_correction(view.camera, view.map, &self.config) {
            Some(fix) => {
                view.translate(self.mover(), fix);
                true
            }
            None => false,
        }
    }

    /// Zooms by `amount` (positive closer) toward `focus`, or toward the
    /// view center when `focus` is `None`.
    pub fn zoom_by(&self, view: &mut NavView<'_>, amount: f64, focus: Option<LocalPoint>) {
        let mover = self.mover();
        let limits = ZoomLimits::for_map(&self.config, view.map);
        let center = view_center_on_plane(view.camera, view.map);
        let dest = focus.map_or(center, |l| view.map.local_to_world(l).0);
        match view.camera.ortho_size() {
            None => {
                let step = (dest - view.camera.position()) * amount;
                view.translate(mover, step);
                let d = camera_distance(view.camera, view.map);
                let clamped = limits.clamp_distance(d);
                if clamped != d {
                    let normal = view.map.normal();
                    view.translate(mover, normal * (clamped - d));
                }
            }
            Some(size) => {
                let new_size = limits.clamp_ortho(size * (1.0 - amount));
                // Shift toward the focus so it stays under the same pixel.
                let f = 1.0 - new_size / size;
                let shift = reject_from(dest - center, view.map.normal()) * f;
                view.translate(mover, shift);
                view.camera.set_ortho_size(new_size);
            }
        }
    }

    fn handle_primary(
        &mut self,
        view: &mut NavView<'_>,
        base: PointerProjector<'_>,
        input: &FrameInput,
        out: &mut NavigationOutput,
    ) -> bool {
        let buttons = input.pointer.primary;
        if buttons.pressed {
            if let Some(at) = input.pointer.position {
                let can_drag = self.config.allow_drag && input.over_map;
                let anchor = if can_drag {
                    view.local_under(base, at)
                } else {
                    None
                };
                self.press = Some(Press {
                    origin: at,
                    last: at,
                    anchor,
                    can_drag,
                    exceeded: false,
                    dragging: false,
                });
                self.stop_glide();
            }
        }

        let Some(mut press) = self.press.take() else {
            return self.glide(view);
        };
        if let Some(at) = input.pointer.position {
            if at.distance(press.origin) > self.config.click_drag_threshold_px {
                press.exceeded = true;
            }
            if press.can_drag && press.exceeded {
                if !press.dragging {
                    press.dragging = true;
                    out.events.push(MapEvent::DragStart);
                    debug!("drag started");
                }
                self.drag_to(view, base, &mut press, at, input.screen, buttons.released);
            }
        }

        if buttons.released || !buttons.held {
            if press.dragging {
                out.events.push(MapEvent::DragEnd);
                debug!("drag ended");
            } else if !press.exceeded {
                out.clicked = true;
            }
            return false;
        }
        self.press = Some(press);
        false
    }

    fn drag_to(
        &mut self,
        view: &mut NavView<'_>,
        base: PointerProjector<'_>,
        press: &mut Press,
        at: ScreenPoint,
        screen: PixelRect,
        releasing: bool,
    ) {
        let mover = self.mover();
        if self.config.drag_constant_speed {
            if at.distance(press.last) < self.config.drag_deadzone_px {
                return;
            }
            // Keep the grabbed point under the pointer.
            if let (Some(anchor), Some(current)) = (press.anchor, view.local_under(base, at)) {
                let delta = view.map.transform_vector((anchor.0 - current.0).extend(0.0));
                view.translate(mover, delta);
            }
        } else {
            let delta = at.0 - press.last.0;
            let magnitude = delta.length() - self.config.drag_deadzone_px;
            if magnitude > 0.0 && !screen.is_empty() {
                let px = delta.normalize_or_zero() * magnitude;
                let per_px = visible_height(view.camera, view.map) / screen.height;
                let camera = &*view.camera;
                let motion = -(camera.right() * px.x + camera.up() * px.y)
                    * per_px
                    * self.config.drag_sensitivity;
                let motion = reject_from(motion, view.map.normal());
                view.translate(mover, motion);
                self.glide = motion;
                self.glide_frame = 1;
            } else if !releasing {
                self.stop_glide();
            }
        }
        press.last = at;
    }

    /// Continues a released direct drag with decreasing speed.
    fn glide(&mut self, view: &mut NavView<'_>) -> bool {
        if self.glide == DVec3::ZERO {
            return false;
        }
        self.glide_frame += 1;
        if self.glide_frame >= DRAG_DAMPING_FRAMES {
            self.stop_glide();
            return false;
        }
        view.translate(self.mover(), self.glide / self.glide_frame as f64);
        true
    }

    fn stop_glide(&mut self) {
        self.glide = DVec3::ZERO;
        self.glide_frame = 0;
    }

    fn handle_secondary(
        &mut self,
        view: &mut NavView<'_>,
        base: PointerProjector<'_>,
        input: &FrameInput,
        out: &mut NavigationOutput,
    ) {
        let buttons = input.pointer.secondary;
        if buttons.pressed {
            self.secondary_origin = input.pointer.position;
        }
        if !buttons.released {
            return;
        }
        let (Some(origin), Some(at)) = (self.secondary_origin.take(), input.pointer.position) else {
            return;
        };
        if at.distance(origin) > self.config.click_drag_threshold_px {
            return;
        }
        out.secondary_clicked = true;
        if !(self.config.center_on_secondary_click && input.over_map) {
            return;
        }
        let target = base
            .with_pose(&*view.camera, &*view.map)
            .project(PointerSource::Screen(at), Bounds::Map);
        if let Some(target) = target {
            let duration = self.config.default_fly_duration;
            let events = self.fly_to(view, target, duration, FlyZoom::Keep, input.time);
            out.events.extend(events);
        }
    }

    fn handle_zoom(
        &mut self,
        view: &mut NavView<'_>,
        base: PointerProjector<'_>,
        input: &FrameInput,
    ) -> bool {
        let pointer = &input.pointer;
        let mut fresh = false;
        if self.config.allow_zoom && (input.over_map || pointer.position.is_none()) {
            let mut impulse = pointer.scroll * self.config.zoom_sensitivity
                + pointer.pinch_px * self.config.pinch_sensitivity;
            if self.config.invert_zoom_direction {
                impulse = -impulse;
            }
            if impulse != 0.0 {
                self.zoom_accel = (self.zoom_accel + impulse).clamp(-MAX_ZOOM_ACCEL, MAX_ZOOM_ACCEL);
                fresh = true;
            }
        }
        if self.zoom_accel == 0.0 {
            return false;
        }
        // Slow wheels and pinches still zoom; only the tail is cut.
        if !fresh && self.zoom_accel.abs() < ZOOM_STOP_THRESHOLD {
            self.zoom_accel = 0.0;
            return false;
        }

        let focus = if self.config.zoom_on_cursor {
            pointer.position.and_then(|at| view.local_under(base, at))
        } else {
            None
        };
        self.zoom_by(view, self.zoom_accel, focus);
        if self.config.constant_zoom_speed {
            self.zoom_accel = 0.0;
        } else {
            self.zoom_accel /= ZOOM_DAMPING;
        }
        true
    }

    fn handle_keys(&mut self, view: &mut NavView<'_>, input: &FrameInput) -> bool {
        if !self.config.allow_keys || input.pan == DVec2::ZERO {
            return false;
        }
        self.pan_view(view, input.pan, self.config.key_pan_speed * input.dt_s)
    }

    fn handle_edge_scroll(&mut self, view: &mut NavView<'_>, input: &FrameInput) -> bool {
        if !self.config.edge_scroll || self.press.is_some() {
            return false;
        }
        let Some(at) = input.pointer.position else {
            return false;
        };
        let screen = input.screen;
        if screen.is_empty() || !screen.contains(at) {
            return false;
        }
        let t = self.config.edge_scroll_threshold_px;
        let mut dir = DVec2::ZERO;
        if at.x() < screen.x + t {
            dir.x = -1.0;
        } else if at.x() > screen.x + screen.width - t {
            dir.x = 1.0;
        }
        if at.y() < screen.y + t {
            dir.y = -1.0;
        } else if at.y() > screen.y + screen.height - t {
            dir.y = 1.0;
        }
        if dir == DVec2::ZERO {
            return false;
        }
        self.pan_view(view, dir.normalize(), self.config.edge_scroll_speed * input.dt_s)
    }

    /// Moves the view along the map plane by `view_heights` visible heights.
    fn pan_view(&self, view: &mut NavView<'_>, dir: DVec2, view_heights: f64) -> bool {
        let camera = &*view.camera;
        let along = reject_from(camera.right() * dir.x + camera.up() * dir.y, view.map.normal())
            .normalize_or_zero();
        let distance = visible_height(camera, view.map) * view_heights;
        if along == DVec3::ZERO || distance <= 0.0 {
            return false;
        }
        view.translate(self.mover(), along * distance);
        true
    }

    /// Dirty check against the previous frame.
    fn observe(&mut self, view: &NavView<'_>) -> bool {
        let snapshot = ViewSnapshot::capture(view);
        let moved = self.last_view != Some(snapshot);
        self.last_view = Some(snapshot);
        moved
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}
