use serde::{Deserialize, Serialize};

use crate::math::{DVec2, ScreenPoint, ViewportPoint};

/// Axis-aligned rectangle in map-local space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub const EMPTY: Self = Self {
        min: DVec2::splat(f64::INFINITY),
        max: DVec2::splat(f64::NEG_INFINITY),
    };

    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[DVec2]) -> Self {
        points.iter().fold(Self::EMPTY, |r, p| r.include(*p))
    }

    pub fn include(self, p: DVec2) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Inclusive containment: points on the edge are inside.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn size(&self) -> DVec2 {
        if self.is_empty() {
            DVec2::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn area(&self) -> f64 {
        let s = self.size();
        s.x * s.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Pixel rectangle on the host surface (origin bottom-left).
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// A rect with no area cannot map pixels to a viewport.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x() >= self.x
            && p.x() <= self.x + self.width
            && p.y() >= self.y
            && p.y() <= self.y + self.height
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Rect-relative normalized position; `None` for an empty rect.
    pub fn normalize(&self, p: ScreenPoint) -> Option<ViewportPoint> {
        if self.is_empty() {
            return None;
        }
        Some(ViewportPoint::new(
            (p.x() - self.x) / self.width,
            (p.y() - self.y) / self.height,
        ))
    }

    pub fn denormalize(&self, v: ViewportPoint) -> ScreenPoint {
        ScreenPoint::new(self.x + v.0.x * self.width, self.y + v.0.y * self.height)
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}
