use foundation::math::ViewportPoint;
use serde::{Deserialize, Serialize};

/// User-tunable navigation settings.
///
/// Distances are expressed relative to the map's world height so the same
/// configuration works for any map scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    // ── Drag ─────────────────────────────────────────────────
    pub allow_drag: bool,
    /// Keep the grabbed map point glued under the pointer instead of
    /// scaling raw pixel deltas.
    pub drag_constant_speed: bool,
    /// Multiplier for direct (non constant-speed) drags.
    pub drag_sensitivity: f64,
    /// Pointer jitter (pixels) ignored while dragging. Direct drags subtract
    /// it from each frame's delta; anchored drags wait until the pointer has
    /// moved this far from where the map was last placed.
    pub drag_deadzone_px: f64,
    /// Net movement (pixels) past which a press is a drag, not a click.
    pub click_drag_threshold_px: f64,
    /// A primary press cancels an in-flight fly-to.
    pub drag_interrupts_fly_to: bool,

    // ── Zoom ─────────────────────────────────────────────────
    pub allow_zoom: bool,
    /// Zoom impulse per wheel notch.
    pub zoom_sensitivity: f64,
    /// Zoom impulse per pixel of change in two-finger separation.
    pub pinch_sensitivity: f64,
    pub invert_zoom_direction: bool,
    /// Zoom toward the point under the pointer rather than the view center.
    pub zoom_on_cursor: bool,
    /// Apply each impulse once instead of easing it out over frames.
    pub constant_zoom_speed: bool,
    /// Closest camera distance, as a multiple of the map height.
    pub min_zoom_distance: f64,
    /// Farthest camera distance, as a multiple of the map height. For
    /// orthographic cameras the size limit is half of this distance.
    pub max_zoom_distance: f64,

    // ── Keyboard & edge scrolling ────────────────────────────
    pub allow_keys: bool,
    /// View heights per second.
    pub key_pan_speed: f64,
    pub edge_scroll: bool,
    pub edge_scroll_threshold_px: f64,
    /// View heights per second.
    pub edge_scroll_speed: f64,

    // ── Bounds ───────────────────────────────────────────────
    /// Keep the map covering the whole view horizontally (or centered
    /// when it is narrower than the view).
    pub fit_width: bool,
    pub fit_height: bool,
    /// On axes that are not fitted, how far (viewport fraction) each map
    /// edge must stay inside the opposite side of the view.
    pub letterbox_limit: f64,

    // ── Camera ───────────────────────────────────────────────
    /// Move the map instead of the camera.
    pub static_camera: bool,
    /// Where a fly-to places its target in the view.
    pub fly_to_anchor: ViewportPoint,
    pub default_fly_duration: f64,
    /// A secondary click flies to the clicked point.
    pub center_on_secondary_click: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            allow_drag: true,
            drag_constant_speed: false,
            drag_sensitivity: 1.0,
            drag_deadzone_px: 0.0,
            click_drag_threshold_px: 4.0,
            drag_interrupts_fly_to: true,

            allow_zoom: true,
            zoom_sensitivity: 0.05,
            pinch_sensitivity: 0.002,
            invert_zoom_direction: false,
            zoom_on_cursor: true,
            constant_zoom_speed: false,
            min_zoom_distance: 0.01,
            max_zoom_distance: 1.6,

            allow_keys: true,
            key_pan_speed: 0.5,
            edge_scroll: false,
            edge_scroll_threshold_px: 8.0,
            edge_scroll_speed: 0.5,

            fit_width: false,
            fit_height: false,
            letterbox_limit: 0.5,

            static_camera: false,
            fly_to_anchor: ViewportPoint::CENTER,
            default_fly_duration: 1.0,
            center_on_secondary_click: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NavigationConfig;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: NavigationConfig =
            serde_json::from_str(r#"{"static_camera":true,"fly_to_anchor":[0.25,0.5]}"#).unwrap();
        assert!(cfg.static_camera);
        assert_eq!(cfg.fly_to_anchor.0.x, 0.25);
        assert_eq!(cfg.max_zoom_distance, NavigationConfig::default().max_zoom_distance);
        assert!(cfg.drag_interrupts_fly_to);
    }
}
