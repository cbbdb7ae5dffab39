//! Named coordinate spaces.
//!
//! Four spaces show up in the engine and mixing them up is the classic source
//! of "the click lands somewhere else" bugs:
//! - `ScreenPoint`: host surface pixels, origin bottom-left, y up.
//! - `ViewportPoint`: normalized `[0, 1]²` inside one camera's pixel rect.
//! - `LocalPoint`: map-local plane coordinates, `[-0.5, 0.5]²` on the map.
//! - `WorldPoint`: 3D world space.
//!
//! Conversions between them live next to the types that own the relation
//! (cameras, transforms, pointer projection), never inline at call sites.

use serde::{Deserialize, Serialize};

use super::{DVec2, DVec3, MAP_HALF_EXTENT};

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint(pub DVec2);

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(self) -> f64 {
        self.0.x
    }

    pub fn y(self) -> f64 {
        self.0.y
    }

    pub fn distance(self, other: Self) -> f64 {
        self.0.distance(other.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportPoint(pub DVec2);

impl ViewportPoint {
    pub const CENTER: Self = Self(DVec2::new(0.5, 0.5));

    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// True when the point lies inside the unit square, edges included.
    pub fn is_inside(self) -> bool {
        (0.0..=1.0).contains(&self.0.x) && (0.0..=1.0).contains(&self.0.y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint(pub DVec2);

impl LocalPoint {
    pub const ORIGIN: Self = Self(DVec2::ZERO);

    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(self) -> f64 {
        self.0.x
    }

    pub fn y(self) -> f64 {
        self.0.y
    }

    /// True when the point lies on the map quad, edges included.
    pub fn is_on_map(self) -> bool {
        self.0.x.abs() <= MAP_HALF_EXTENT && self.0.y.abs() <= MAP_HALF_EXTENT
    }

    pub fn distance_squared(self, other: Self) -> f64 {
        self.0.distance_squared(other.0)
    }

    /// Lifts the point onto the local map plane (z = 0).
    pub fn extend(self) -> DVec3 {
        self.0.extend(0.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint(pub DVec3);

impl WorldPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }
}
