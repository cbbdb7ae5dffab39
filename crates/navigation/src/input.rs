//! Host input abstraction.
//!
//! The engine never talks to a windowing system. Hosts implement
//! [`InputSource`] (or fill an [`InputState`]) once per frame, and
//! [`TouchTracker`] folds touches into the same pointer model as the mouse.

use foundation::math::{DVec2, Ray, ScreenPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Primary,
    Secondary,
}

/// Keys the navigation layer reacts to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
}

impl Key {
    pub fn pan_direction(self) -> DVec2 {
        match self {
            Key::ArrowUp | Key::W => DVec2::Y,
            Key::ArrowDown | Key::S => DVec2::NEG_Y,
            Key::ArrowLeft | Key::A => DVec2::NEG_X,
            Key::ArrowRight | Key::D => DVec2::X,
        }
    }

    pub const ALL: [Key; 8] = [
        Key::ArrowUp,
        Key::ArrowDown,
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
    ];
}

/// Edge-triggered button state for one frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonState {
    /// Went down this frame.
    pub pressed: bool,
    /// Is down (including the frame it was pressed).
    pub held: bool,
    /// Went up this frame.
    pub released: bool,
}

impl ButtonState {
    pub const UP: Self = Self {
        pressed: false,
        held: false,
        released: false,
    };
    pub const PRESS: Self = Self {
        pressed: true,
        held: true,
        released: false,
    };
    pub const HOLD: Self = Self {
        pressed: false,
        held: true,
        released: false,
    };
    pub const RELEASE: Self = Self {
        pressed: false,
        held: false,
        released: true,
    };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Touch {
    pub id: u64,
    pub position: ScreenPoint,
}

/// Per-frame input as seen by the engine.
pub trait InputSource {
    /// Pointer position in host pixels (origin bottom-left), if any.
    fn pointer_position(&self) -> Option<ScreenPoint>;
    fn button(&self, button: MouseButton) -> ButtonState;
    fn key_held(&self, key: Key) -> bool;
    /// Wheel notches this frame, positive zooms in.
    fn scroll_delta(&self) -> f64;
    fn touches(&self) -> &[Touch] {
        &[]
    }
    /// World-space pointer ray for hosts without a screen pointer.
    fn pointer_ray(&self) -> Option<Ray> {
        None
    }
}

/// Plain-data [`InputSource`] a host can fill directly.
///
/// Call [`InputState::end_frame`] after each engine update to clear edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub pointer: Option<ScreenPoint>,
    pub primary: ButtonState,
    pub secondary: ButtonState,
    pub keys: Vec<Key>,
    pub scroll: f64,
    pub touches: Vec<Touch>,
    pub ray: Option<Ray>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.pointer = Some(ScreenPoint::new(x, y));
    }

    pub fn press(&mut self, button: MouseButton) {
        *self.button_mut(button) = ButtonState::PRESS;
    }

    pub fn release(&mut self, button: MouseButton) {
        *self.button_mut(button) = ButtonState::RELEASE;
    }

    pub fn hold_key(&mut self, key: Key) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn release_key(&mut self, key: Key) {
        self.keys.retain(|k| *k != key);
    }

    pub fn scroll(&mut self, notches: f64) {
        self.scroll += notches;
    }

    /// Turns presses into holds, drops releases and resets the wheel.
    pub fn end_frame(&mut self) {
        for b in [&mut self.primary, &mut self.secondary] {
            *b = if b.held {
                ButtonState::HOLD
            } else {
                ButtonState::UP
            };
        }
        self.scroll = 0.0;
    }

    fn button_mut(&mut self, button: MouseButton) -> &mut ButtonState {
        match button {
            MouseButton::Primary => &mut self.primary,
            MouseButton::Secondary => &mut self.secondary,
        }
    }
}

impl InputSource for InputState {
    fn pointer_position(&self) -> Option<ScreenPoint> {
        self.pointer
    }

    fn button(&self, button: MouseButton) -> ButtonState {
        match button {
            MouseButton::Primary => self.primary,
            MouseButton::Secondary => self.secondary,
        }
    }

    fn key_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn scroll_delta(&self) -> f64 {
        self.scroll
    }

    fn touches(&self) -> &[Touch] {
        &self.touches
    }

    fn pointer_ray(&self) -> Option<Ray> {
        self.ray
    }
}

/// Unified pointer for one frame, after touch folding.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointerFrame {
    pub position: Option<ScreenPoint>,
    pub primary: ButtonState,
    pub secondary: ButtonState,
    pub scroll: f64,
    /// Change in two-finger separation (pixels), positive when spreading.
    pub pinch_px: f64,
}

/// Folds touches into the mouse model: one finger drives the primary
/// button, two fingers pinch-zoom around their midpoint.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    touching: bool,
    last_touch: Option<ScreenPoint>,
    pinch_span: Option<f64>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn resolve(&mut self, input: &dyn InputSource) -> PointerFrame {
        let touches = input.touches();
        match touches {
            [] => {
                self.pinch_span = None;
                if self.touching {
                    self.touching = false;
                    return PointerFrame {
                        position: self.last_touch,
                        primary: ButtonState::RELEASE,
                        ..PointerFrame::default()
                    };
                }
                PointerFrame {
                    position: input.pointer_position(),
                    primary: input.button(MouseButton::Primary),
                    secondary: input.button(MouseButton::Secondary),
                    scroll: input.scroll_delta(),
                    pinch_px: 0.0,
                }
            }
            [one] => {
                let primary = if self.touching {
                    ButtonState::HOLD
                } else {
                    ButtonState::PRESS
                };
                self.touching = true;
                self.pinch_span = None;
                self.last_touch = Some(one.position);
                PointerFrame {
                    position: Some(one.position),
                    primary,
                    ..PointerFrame::default()
                }
            }
            [a, b, ..] => {
                // A second finger ends any one-finger drag.
                let primary = if self.touching {
                    ButtonState::RELEASE
                } else {
                    ButtonState::UP
                };
                self.touching = false;
                let span = a.position.distance(b.position);
                let pinch_px = self.pinch_span.map_or(0.0, |prev| span - prev);
                self.pinch_span = Some(span);
                let mid = ScreenPoint((a.position.0 + b.position.0) * 0.5);
                PointerFrame {
                    position: Some(mid),
                    primary,
                    pinch_px,
                    ..PointerFrame::default()
                }
            }
        }
    }
}

/// Summed pan direction of the held keys, normalized.
pub fn key_pan_direction(input: &dyn InputSource) -> DVec2 {
    Key::ALL
        .iter()
        .filter(|k| input.key_held(**k))
        .map(|k| k.pan_direction())
        .sum::<DVec2>()
        .normalize_or_zero()
}
