use super::{DVec2, LocalPoint};

/// Mean Earth radius (kilometers) for great-circle distances.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6_371.0;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLon {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl LatLon {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}

/// The map is an equirectangular projection: local x spans 360° of
/// longitude and local y spans 180° of latitude.
pub fn local_to_lat_lon(p: LocalPoint) -> LatLon {
    LatLon::new(p.y() * 180.0, p.x() * 360.0)
}

pub fn lat_lon_to_local(ll: LatLon) -> LocalPoint {
    LocalPoint(DVec2::new(ll.lon_deg / 360.0, ll.lat_deg / 180.0))
}

/// Haversine distance between two points on a sphere of `radius`.
pub fn great_circle_distance(a: LatLon, b: LatLon, radius: f64) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * radius * h.sqrt().clamp(0.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_lat_lon_round_trip() {
        let p = LocalPoint::new(0.25, -0.125);
        let ll = local_to_lat_lon(p);
        assert_eq!(ll, LatLon::new(-22.5, 90.0));
        assert_eq!(lat_lon_to_local(ll), p);
    }

    #[test]
    fn quarter_meridian_distance() {
        let d = great_circle_distance(
            LatLon::new(0.0, 0.0),
            LatLon::new(90.0, 0.0),
            EARTH_MEAN_RADIUS_KM,
        );
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_MEAN_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn same_point_is_zero_distance() {
        let a = LatLon::new(48.85, 2.35);
        assert_eq!(great_circle_distance(a, a, EARTH_MEAN_RADIUS_KM), 0.0);
    }
}
