use foundation::math::{LocalPoint, cmp_key_then_index};
use runtime::Metrics;
use serde::{Deserialize, Serialize};

use crate::MapWorld;
use crate::entity::Region;

/// Counter names recorded by the hit-tester.
pub mod counters {
    pub const COUNTRY_BOUNDS_CHECKS: &str = "hit_test.country_bounds_checks";
    pub const PROVINCE_BOUNDS_CHECKS: &str = "hit_test.province_bounds_checks";
    pub const REGION_BOUNDS_CHECKS: &str = "hit_test.region_bounds_checks";
    pub const POLYGON_TESTS: &str = "hit_test.polygon_tests";
    pub const CITY_DISTANCE_CHECKS: &str = "hit_test.city_distance_checks";
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitOptions {
    /// Resolve provinces inside the hit country.
    pub provinces: bool,
    /// Resolve the nearest city.
    pub cities: bool,
    /// City pick tolerance in map-local units.
    pub city_radius: f64,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            provinces: true,
            cities: true,
            city_radius: 0.003,
        }
    }
}

/// An entity index plus the index of its polygon that contains the point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionHit {
    pub entity: usize,
    pub region: usize,
}

/// Everything under one map-local point. `None` means nothing of that kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapHit {
    pub country: Option<RegionHit>,
    pub province: Option<RegionHit>,
    pub city: Option<usize>,
}

impl MapHit {
    pub const NONE: Self = Self {
        country: None,
        province: None,
        city: None,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Resolves the country, province and city under `point`.
///
/// Countries are walked in the world's priority order, so when polygons
/// overlap the earlier country wins. Provinces are only considered inside the
/// hit country. Cities are searched inside the hit country, or across all
/// visible countries when the point is over no country.
pub fn hit_test(
    world: &MapWorld,
    point: LocalPoint,
    opts: &HitOptions,
    metrics: &mut Metrics,
) -> MapHit {
    let country = country_at(world, point, metrics);
    let province = match country {
        Some(c) if opts.provinces => province_at(world, c.entity, point, metrics),
        _ => None,
    };
    let city = if opts.cities {
        nearest_city(
            world,
            point,
            country.map(|c| c.entity),
            opts.city_radius,
            metrics,
        )
    } else {
        None
    };
    MapHit {
        country,
        province,
        city,
    }
}

pub fn country_at(world: &MapWorld, point: LocalPoint, metrics: &mut Metrics) -> Option<RegionHit> {
    for &index in world.country_priority() {
        let Some(country) = world.country(index) else {
            continue;
        };
        if country.hidden {
            continue;
        }
        metrics.inc(counters::COUNTRY_BOUNDS_CHECKS);
        if !country.bounds.contains(point.0) {
            continue;
        }
        if let Some(region) = first_containing_region(&country.regions, point, metrics) {
            return Some(RegionHit {
                entity: index,
                region,
            });
        }
    }
    None
}

pub fn province_at(
    world: &MapWorld,
    country: usize,
    point: LocalPoint,
    metrics: &mut Metrics,
) -> Option<RegionHit> {
    let owner = world.country(country)?;
    for &index in &owner.provinces {
        let Some(province) = world.province(index) else {
            continue;
        };
        metrics.inc(counters::PROVINCE_BOUNDS_CHECKS);
        if !province.bounds.contains(point.0) {
            continue;
        }
        if let Some(region) = first_containing_region(&province.regions, point, metrics) {
            return Some(RegionHit {
                entity: index,
                region,
            });
        }
    }
    None
}

/// Closest city within `radius` of `point`; equal distances go to the
/// lower index.
pub fn nearest_city(
    world: &MapWorld,
    point: LocalPoint,
    country: Option<usize>,
    radius: f64,
    metrics: &mut Metrics,
) -> Option<usize> {
    let r2 = radius * radius;
    let mut best: Option<(f64, usize)> = None;
    for city in world.cities() {
        match country {
            Some(k) if city.country != k => continue,
            None if world.country(city.country).is_some_and(|c| c.hidden) => continue,
            _ => {}
        }
        metrics.inc(counters::CITY_DISTANCE_CHECKS);
        let d2 = city.position.distance_squared(point);
        if d2 > r2 {
            continue;
        }
        let candidate = (d2, city.index);
        best = match best {
            Some(b) if cmp_key_then_index(b, candidate).is_le() => Some(b),
            _ => Some(candidate),
        };
    }
    best.map(|(_, index)| index)
}

fn first_containing_region(
    regions: &[Region],
    point: LocalPoint,
    metrics: &mut Metrics,
) -> Option<usize> {
    regions.iter().position(|region| {
        metrics.inc(counters::REGION_BOUNDS_CHECKS);
        if !region.bounds().contains(point.0) {
            return false;
        }
        metrics.inc(counters::POLYGON_TESTS);
        region.polygon_contains(point.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CityClass;
    use foundation::math::DVec2;
    use pretty_assertions::assert_eq;

    fn square(cx: f64, cy: f64, half: f64) -> Region {
        Region::new(vec![
            DVec2::new(cx - half, cy - half),
            DVec2::new(cx + half, cy - half),
            DVec2::new(cx + half, cy + half),
            DVec2::new(cx - half, cy + half),
        ])
    }

    fn two_countries() -> MapWorld {
        let mut w = MapWorld::new();
        w.add_country("A", "", vec![square(0.0, 0.0, 0.1)]).unwrap();
        w.add_country("B", "", vec![square(0.35, 0.35, 0.05)]).unwrap();
        w
    }

    fn hit(w: &MapWorld, x: f64, y: f64, m: &mut Metrics) -> MapHit {
        hit_test(w, LocalPoint::new(x, y), &HitOptions::default(), m)
    }

    #[test]
    fn resolves_country_and_region() {
        let w = two_countries();
        let mut m = Metrics::new();
        assert_eq!(
            hit(&w, 0.0, 0.0, &mut m).country,
            Some(RegionHit { entity: 0, region: 0 })
        );
        assert_eq!(
            hit(&w, 0.35, 0.35, &mut m).country,
            Some(RegionHit { entity: 1, region: 0 })
        );
    }

    #[test]
    fn outside_every_rect_runs_no_polygon_test() {
        let w = two_countries();
        let mut m = Metrics::new();
        let h = hit(&w, 0.45, 0.45, &mut m);
        assert!(h.is_empty());
        assert_eq!(m.counter(counters::POLYGON_TESTS), 0);
        assert_eq!(m.counter(counters::COUNTRY_BOUNDS_CHECKS), 2);
    }

    #[test]
    fn overlap_resolves_by_priority() {
        let mut w = MapWorld::new();
        w.add_country("Outer", "", vec![square(0.0, 0.0, 0.2)]).unwrap();
        w.add_country("Enclave", "", vec![square(0.0, 0.0, 0.02)]).unwrap();
        let mut m = Metrics::new();
        assert_eq!(hit(&w, 0.0, 0.0, &mut m).country.unwrap().entity, 1);

        w.set_country_priority(vec![0, 1]).unwrap();
        assert_eq!(hit(&w, 0.0, 0.0, &mut m).country.unwrap().entity, 0);
    }

    #[test]
    fn hidden_countries_are_skipped() {
        let mut w = two_countries();
        w.set_country_hidden(0, true).unwrap();
        let mut m = Metrics::new();
        assert!(hit(&w, 0.0, 0.0, &mut m).country.is_none());
    }

    #[test]
    fn second_region_is_reported() {
        let mut w = MapWorld::new();
        w.add_country("Islands", "", vec![square(-0.3, 0.0, 0.02), square(0.3, 0.0, 0.02)])
            .unwrap();
        let mut m = Metrics::new();
        assert_eq!(
            hit(&w, 0.3, 0.0, &mut m).country,
            Some(RegionHit { entity: 0, region: 1 })
        );
    }

    #[test]
    fn provinces_only_when_enabled() {
        let mut w = two_countries();
        w.add_province(0, "West", vec![square(-0.05, 0.0, 0.05)]).unwrap();
        w.add_province(0, "East", vec![square(0.05, 0.0, 0.05)]).unwrap();
        let mut m = Metrics::new();

        let h = hit(&w, 0.07, 0.0, &mut m);
        assert_eq!(h.province, Some(RegionHit { entity: 1, region: 0 }));

        let opts = HitOptions {
            provinces: false,
            ..HitOptions::default()
        };
        let h = hit_test(&w, LocalPoint::new(0.07, 0.0), &opts, &mut m);
        assert_eq!(h.province, None);
        assert!(h.country.is_some());
    }

    #[test]
    fn nearest_city_is_scoped_and_tie_broken_by_index() {
        let mut w = two_countries();
        let a0 = w
            .add_city(0, None, "a0", LocalPoint::new(0.001, 0.0), CityClass::Ordinary, 1)
            .unwrap();
        let _a1 = w
            .add_city(0, None, "a1", LocalPoint::new(-0.001, 0.0), CityClass::Ordinary, 1)
            .unwrap();
        // Closer, but in another country.
        w.add_city(1, None, "b0", LocalPoint::new(0.0, 0.0), CityClass::Ordinary, 1)
            .unwrap();

        let mut m = Metrics::new();
        let h = hit(&w, 0.0, 0.0, &mut m);
        assert_eq!(h.city, Some(a0));

        // Off every country: unscoped search.
        let found = nearest_city(&w, LocalPoint::new(0.0, 0.0), None, 0.01, &mut m);
        assert_eq!(found, Some(2));

        let far = nearest_city(&w, LocalPoint::new(0.2, 0.2), None, 0.01, &mut m);
        assert_eq!(far, None);
    }
}
