//! Animated transitions that bring a map point to a chosen spot of the view.

use foundation::math::{DQuat, DVec3, LocalPoint, ViewportPoint, clamp01, smoothstep};
use foundation::time::Time;
use scene::components::Transform;
use serde::{Deserialize, Serialize};
use viewport::Camera;

use crate::controller::NavView;
use crate::limits::{ZoomLimits, camera_distance};

/// Zoom requested by a fly-to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FlyZoom {
    /// Keep the current distance (or orthographic size).
    Keep,
    /// Multiple of the distance at which the map height fills the view;
    /// `1.0` frames the whole map.
    Level(f64),
    /// Absolute camera distance from the map plane.
    Distance(f64),
}

/// Which object a navigation step moves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mover {
    Camera,
    /// Static-camera mode: the map moves instead.
    Map,
}

/// Pose of the moving object plus the camera's orthographic size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
    pub ortho_size: Option<f64>,
}

impl Pose {
    pub fn capture(view: &NavView<'_>, mover: Mover) -> Self {
        let t = match mover {
            Mover::Camera => &view.camera.transform,
            Mover::Map => &*view.map,
        };
        Self {
            position: t.position,
            rotation: t.rotation,
            ortho_size: view.camera.ortho_size(),
        }
    }

    pub fn apply(&self, view: &mut NavView<'_>, mover: Mover) {
        let t = match mover {
            Mover::Camera => &mut view.camera.transform,
            Mover::Map => &mut *view.map,
        };
        t.position = self.position;
        t.rotation = self.rotation;
        if let Some(size) = self.ortho_size {
            view.camera.set_ortho_size(size);
        }
    }

    pub fn lerp(&self, other: &Pose, s: f64) -> Pose {
        Pose {
            position: self.position.lerp(other.position, s),
            rotation: self.rotation.slerp(other.rotation, s),
            ortho_size: match (self.ortho_size, other.ortho_size) {
                (Some(a), Some(b)) => Some(a + (b - a) * s),
                (_, b) => b,
            },
        }
    }
}

/// A planned transition from the current pose to one that shows `target`
/// at the anchor point of the view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlyTo {
    pub mover: Mover,
    pub target: LocalPoint,
    pub start: Pose,
    pub end: Pose,
    pub start_time: Time,
    pub duration: f64,
}

impl FlyTo {
    #[allow(clippy::too_many_arguments)]
    pub fn plan(
        view: &NavView<'_>,
        mover: Mover,
        target: LocalPoint,
        zoom: FlyZoom,
        anchor: ViewportPoint,
        limits: &ZoomLimits,
        now: Time,
        duration: f64,
    ) -> Self {
        let start = Pose::capture(view, mover);
        let end = end_pose(&*view.camera, &*view.map, mover, target, zoom, anchor, limits);
        Self {
            mover,
            target,
            start,
            end,
            start_time: now,
            duration,
        }
    }

    /// Linear progress in `[0, 1]`; non-positive durations are complete.
    pub fn progress(&self, now: Time) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        clamp01(now.seconds_since(self.start_time) / self.duration)
    }

    pub fn sample(&self, now: Time) -> Pose {
        self.start.lerp(&self.end, smoothstep(self.progress(now)))
    }

    /// Moves the view to the pose for `now`; returns `true` once finished.
    pub fn step(&self, view: &mut NavView<'_>, now: Time) -> bool {
        let done = self.progress(now) >= 1.0;
        let pose = if done { self.end } else { self.sample(now) };
        pose.apply(view, self.mover);
        done
    }
}

fn end_pose(
    camera: &Camera,
    map: &Transform,
    mover: Mover,
    target: LocalPoint,
    zoom: FlyZoom,
    anchor: ViewportPoint,
    limits: &ZoomLimits,
) -> Pose {
    let height = map.plane_size().y;
    let current = camera_distance(camera, map).abs();
    let (distance, ortho_size) = match camera.ortho_size() {
        None => {
            let d = match zoom {
                FlyZoom::Keep => current,
                FlyZoom::Level(level) => level * camera.fit_distance(height),
                FlyZoom::Distance(d) => d,
            };
            (limits.clamp_distance(d.abs()), None)
        }
        Some(size) => {
            let (d, s) = match zoom {
                FlyZoom::Keep => (current, size),
                FlyZoom::Level(level) => (current, level * height * 0.5),
                FlyZoom::Distance(d) => (d.abs(), size),
            };
            (d, Some(limits.clamp_ortho(s)))
        }
    };

    let mut framing = *camera;
    if let Some(size) = ortho_size {
        framing.set_ortho_size(size);
    }
    // Offset of the anchor from the view center on the map plane.
    let offset = framing.half_extents_at(distance) * (anchor.0 * 2.0 - 1.0);

    match mover {
        Mover::Camera => {
            let rotation = map.rotation;
            let target_world = map.local_to_world(target).0;
            Pose {
                position: target_world + rotation * DVec3::new(-offset.x, -offset.y, distance),
                rotation,
                ortho_size,
            }
        }
        Mover::Map => {
            // The map turns to face the camera and slides under it.
            let rotation = camera.transform.rotation;
            let target_world = camera.position() + rotation * DVec3::new(offset.x, offset.y, -distance);
            Pose {
                position: target_world - rotation * (map.scale * target.extend()),
                rotation,
                ortho_size,
            }
        }
    }
}
