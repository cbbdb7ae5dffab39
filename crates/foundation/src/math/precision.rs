//! Deterministic float ordering.
//!
//! Anything that sorts floats or breaks ties between candidates (hit-test
//! priority, nearest-city search, nearest collider) goes through these
//! helpers so results do not depend on `-0.0` vs `0.0` or NaN payloads.

use core::cmp::Ordering;

/// `-0.0` becomes `0.0`; every NaN becomes the canonical NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Orders `(key, index)` candidates: smaller key first, then lower index.
pub fn cmp_key_then_index(a: (f64, usize), b: (f64, usize)) -> Ordering {
    stable_total_cmp_f64(a.0, b.0).then_with(|| a.1.cmp(&b.1))
}
