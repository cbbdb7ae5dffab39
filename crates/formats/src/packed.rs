//! Packed coordinate strings.
//!
//! Geometry is stored as fixed-point integers in decimal text:
//! a value `v` is written as `round(v * PACKED_SCALE)`. A point is `"x,y"`,
//! a polygon is points joined by `;` and a multi-region shape is polygons
//! joined by `*`.
//!
//! ```text
//! -250000,125000;250000,125000;0,-500000*1000,1000;2000,1000;1500,2000
//! ```

use foundation::math::DVec2;
use thiserror::Error;

/// Fixed-point scale. One step is `1 / PACKED_SCALE` local units.
pub const PACKED_SCALE: f64 = 5_000_000.0;

pub const POINT_SEPARATOR: char = ';';
pub const REGION_SEPARATOR: char = '*';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackedError {
    #[error("invalid number {token:?}")]
    InvalidNumber { token: String },
    #[error("point {index} must be \"x,y\", got {text:?}")]
    InvalidPoint { index: usize, text: String },
    #[error("polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

pub fn encode_value(v: f64) -> i64 {
    (v * PACKED_SCALE).round() as i64
}

pub fn decode_value(token: &str) -> Result<f64, PackedError> {
    let token = token.trim();
    let raw: i64 = token.parse().map_err(|_| PackedError::InvalidNumber {
        token: token.to_string(),
    })?;
    Ok(raw as f64 / PACKED_SCALE)
}

pub fn encode_point(p: DVec2) -> String {
    format!("{},{}", encode_value(p.x), encode_value(p.y))
}

pub fn decode_point(text: &str) -> Result<DVec2, PackedError> {
    decode_point_at(0, text)
}

fn decode_point_at(index: usize, text: &str) -> Result<DVec2, PackedError> {
    let mut parts = text.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => Ok(DVec2::new(decode_value(x)?, decode_value(y)?)),
        _ => Err(PackedError::InvalidPoint {
            index,
            text: text.to_string(),
        }),
    }
}

pub fn encode_polygon(points: &[DVec2]) -> String {
    points
        .iter()
        .map(|p| encode_point(*p))
        .collect::<Vec<_>>()
        .join(&POINT_SEPARATOR.to_string())
}

/// Decodes one polygon. Empty segments (a trailing `;`) are skipped.
pub fn decode_polygon(text: &str) -> Result<Vec<DVec2>, PackedError> {
    let points = text
        .split(POINT_SEPARATOR)
        .filter(|s| !s.trim().is_empty())
        .enumerate()
        .map(|(i, s)| decode_point_at(i, s))
        .collect::<Result<Vec<_>, _>>()?;
    if points.len() < 3 {
        return Err(PackedError::TooFewPoints(points.len()));
    }
    Ok(points)
}

pub fn encode_regions(regions: &[Vec<DVec2>]) -> String {
    regions
        .iter()
        .map(|r| encode_polygon(r))
        .collect::<Vec<_>>()
        .join(&REGION_SEPARATOR.to_string())
}

pub fn decode_regions(text: &str) -> Result<Vec<Vec<DVec2>>, PackedError> {
    text.split(REGION_SEPARATOR)
        .filter(|s| !s.trim().is_empty())
        .map(decode_polygon)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn value_round_trip_stays_within_one_step() {
        for v in [0.0, 0.5, -0.5, 0.123_456_789, -0.333_333_333_3, 1e-9, 0.499_999_99] {
            let decoded = decode_value(&encode_value(v).to_string()).unwrap();
            assert!((decoded - v).abs() <= 1.0 / PACKED_SCALE, "{v} -> {decoded}");
        }
    }

    #[test]
    fn decodes_documented_example() {
        let regions = decode_regions(
            "-250000,125000;250000,125000;0,-500000*1000,1000;2000,1000;1500,2000",
        )
        .unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0][0], DVec2::new(-0.05, 0.025));
        assert_eq!(regions[0][2], DVec2::new(0.0, -0.1));
        assert_eq!(regions[1].len(), 3);
    }

    #[test]
    fn polygon_text_round_trips() {
        let text = "0,0;5000,0;5000,5000;0,5000";
        assert_eq!(encode_polygon(&decode_polygon(text).unwrap()), text);
    }

    #[test]
    fn tolerates_whitespace_and_trailing_separators() {
        let pts = decode_polygon(" 0, 0 ;10,0; 10,10;").unwrap();
        assert_eq!(pts.len(), 3);
    }

    #[test]
    fn reports_malformed_input() {
        assert_eq!(
            decode_value("12a"),
            Err(PackedError::InvalidNumber { token: "12a".into() })
        );
        assert_eq!(
            decode_polygon("0,0;1,1,1;2,2"),
            Err(PackedError::InvalidPoint {
                index: 1,
                text: "1,1,1".into()
            })
        );
        assert_eq!(decode_polygon("0,0;1,1"), Err(PackedError::TooFewPoints(2)));
    }
}
