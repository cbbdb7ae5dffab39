use std::any::Any;
use std::collections::HashMap;

use foundation::math::{EARTH_MEAN_RADIUS_KM, LocalPoint, great_circle_distance, local_to_lat_lon};
use scene::MapWorld;

use crate::error::EngineError;
use crate::subsystems::Subsystem;

/// Great-circle distances between map points and cities, treating the map
/// as an equirectangular projection of a sphere.
#[derive(Debug, Clone)]
pub struct DistanceCalculator {
    radius_km: f64,
    cities: HashMap<(usize, usize), f64>,
}

impl Default for DistanceCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceCalculator {
    pub fn new() -> Self {
        Self::with_radius(EARTH_MEAN_RADIUS_KM)
    }

    pub fn with_radius(radius_km: f64) -> Self {
        Self {
            radius_km,
            cities: HashMap::new(),
        }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn distance_km(&self, a: LocalPoint, b: LocalPoint) -> f64 {
        great_circle_distance(local_to_lat_lon(a), local_to_lat_lon(b), self.radius_km)
    }

    /// Distance between two cities by index; results are cached until the
    /// next map reload.
    pub fn city_distance_km(&mut self, world: &MapWorld, a: usize, b: usize) -> Option<f64> {
        let key = (a.min(b), a.max(b));
        if let Some(d) = self.cities.get(&key) {
            return Some(*d);
        }
        let d = self.distance_km(world.city(a)?.position, world.city(b)?.position);
        self.cities.insert(key, d);
        Some(d)
    }

    pub fn city_distance_by_name(
        &mut self,
        world: &MapWorld,
        a: &str,
        b: &str,
    ) -> Result<f64, EngineError> {
        let ia = world
            .city_index(a, None)
            .ok_or_else(|| EngineError::UnknownCity(a.to_string()))?;
        let ib = world
            .city_index(b, None)
            .ok_or_else(|| EngineError::UnknownCity(b.to_string()))?;
        self.city_distance_km(world, ia, ib)
            .ok_or_else(|| EngineError::UnknownCity(b.to_string()))
    }

    pub fn cached(&self) -> usize {
        self.cities.len()
    }
}

impl Subsystem for DistanceCalculator {
    fn name(&self) -> &'static str {
        "distance_calculator"
    }

    fn on_map_reloaded(&mut self, _world: &MapWorld) {
        self.cities.clear();
    }

    fn shutdown(&mut self) {
        self.cities.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::CityClass;

    fn world() -> MapWorld {
        let mut w = MapWorld::new();
        let c = w.add_country("Equatoria", "Nowhere", Vec::new()).unwrap();
        // 90 degrees of longitude apart on the equator.
        w.add_city(c, None, "West", LocalPoint::new(0.0, 0.0), CityClass::Ordinary, 10)
            .unwrap();
        w.add_city(c, None, "East", LocalPoint::new(0.25, 0.0), CityClass::Ordinary, 10)
            .unwrap();
        w
    }

    #[test]
    fn quarter_turn_on_the_equator() {
        let calc = DistanceCalculator::new();
        let d = calc.distance_km(LocalPoint::new(0.0, 0.0), LocalPoint::new(0.25, 0.0));
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_MEAN_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn city_distances_are_cached_symmetrically() {
        let w = world();
        let mut calc = DistanceCalculator::new();
        let ab = calc.city_distance_km(&w, 0, 1).unwrap();
        let ba = calc.city_distance_km(&w, 1, 0).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(calc.cached(), 1);
        calc.on_map_reloaded(&w);
        assert_eq!(calc.cached(), 0);
    }

    #[test]
    fn unknown_city_names_are_errors() {
        let w = world();
        let mut calc = DistanceCalculator::new();
        assert!(calc.city_distance_by_name(&w, "West", "East").is_ok());
        assert!(matches!(
            calc.city_distance_by_name(&w, "West", "Atlantis"),
            Err(EngineError::UnknownCity(name)) if name == "Atlantis"
        ));
    }
}
