use serde::{Deserialize, Serialize};

/// Engine time in seconds.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn seconds_since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }

    pub fn after(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }
}
