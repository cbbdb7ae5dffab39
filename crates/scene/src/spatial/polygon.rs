use foundation::math::DVec2;

/// Collinearity tolerance for the on-edge test.
pub const EDGE_EPSILON: f64 = 1e-12;

/// True if `p` lies on the closed segment `a`-`b`.
pub fn point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return ap.length_squared() <= EDGE_EPSILON * EDGE_EPSILON;
    }
    if ab.perp_dot(ap).abs() > EDGE_EPSILON * len2.sqrt().max(1.0) {
        return false;
    }
    let d = ab.dot(ap);
    d >= 0.0 && d <= len2
}

/// Even-odd polygon containment with boundary points counted as inside.
///
/// The ring may be open or closed (first point repeated); winding order does
/// not matter. Fewer than three vertices never contain anything.
pub fn contains_point(ring: &[DVec2], p: DVec2) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if point_on_segment(p, a, b) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace area; positive for counter-clockwise rings.
pub fn signed_area(ring: &[DVec2]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        acc += ring[j].perp_dot(ring[i]);
        j = i;
    }
    acc * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(min, min),
            DVec2::new(max, min),
            DVec2::new(max, max),
            DVec2::new(min, max),
        ]
    }

    #[test]
    fn interior_and_exterior() {
        let sq = square(-0.1, 0.1);
        assert!(contains_point(&sq, DVec2::ZERO));
        assert!(!contains_point(&sq, DVec2::new(0.2, 0.0)));
    }

    #[test]
    fn boundary_points_are_inside() {
        let sq = square(-0.1, 0.1);
        assert!(contains_point(&sq, DVec2::new(0.1, 0.0)));
        assert!(contains_point(&sq, DVec2::new(-0.1, -0.1)));
        assert!(contains_point(&sq, DVec2::new(0.0, 0.1)));
    }

    #[test]
    fn concave_notch_is_outside() {
        // U shape opening upwards.
        let u = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(0.0, 3.0),
        ];
        assert!(!contains_point(&u, DVec2::new(1.5, 2.0)));
        assert!(contains_point(&u, DVec2::new(0.5, 2.0)));
        assert!(contains_point(&u, DVec2::new(1.5, 0.5)));
    }

    #[test]
    fn degenerate_rings_contain_nothing() {
        assert!(!contains_point(&[DVec2::ZERO, DVec2::X], DVec2::ZERO));
    }

    #[test]
    fn area_sign_follows_winding() {
        let sq = square(0.0, 2.0);
        assert_eq!(signed_area(&sq), 4.0);
        let rev: Vec<_> = sq.into_iter().rev().collect();
        assert_eq!(signed_area(&rev), -4.0);
    }
}
