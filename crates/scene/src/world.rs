use std::collections::HashMap;

use foundation::math::{LocalPoint, cmp_key_then_index};
use thiserror::Error;
use tracing::warn;

use crate::entity::{City, CityClass, Country, MaterialId, Province, Region};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("unknown country index {0}")]
    UnknownCountry(usize),
    #[error("unknown province index {0}")]
    UnknownProvince(usize),
    #[error("duplicate country name {0:?}")]
    DuplicateCountry(String),
    #[error("priority order has {got} entries, expected {expected}")]
    PriorityLength { got: usize, expected: usize },
    #[error("priority order repeats or skips country {0}")]
    PriorityNotPermutation(usize),
}

/// The loaded map: countries, provinces and cities with their geometry.
///
/// Built once per load and replaced wholesale on reload, so indices handed
/// out by one world are never used against another.
#[derive(Debug, Clone, Default)]
pub struct MapWorld {
    countries: Vec<Country>,
    provinces: Vec<Province>,
    cities: Vec<City>,
    priority: Vec<usize>,
    custom_priority: bool,
    by_name: HashMap<String, usize>,
}

impl MapWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn add_country(
        &mut self,
        name: impl Into<String>,
        continent: impl Into<String>,
        regions: Vec<Region>,
    ) -> Result<usize, WorldError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(WorldError::DuplicateCountry(name));
        }
        let index = self.countries.len();
        self.by_name.insert(name.clone(), index);
        self.countries
            .push(Country::new(index, name, continent, regions));
        if self.custom_priority {
            self.priority.push(index);
        } else {
            self.rebuild_default_priority();
        }
        Ok(index)
    }

    pub fn add_province(
        &mut self,
        country: usize,
        name: impl Into<String>,
        regions: Vec<Region>,
    ) -> Result<usize, WorldError> {
        let index = self.provinces.len();
        let owner = self
            .countries
            .get_mut(country)
            .ok_or(WorldError::UnknownCountry(country))?;
        owner.provinces.push(index);
        self.provinces
            .push(Province::new(index, name, country, regions));
        Ok(index)
    }

    pub fn add_city(
        &mut self,
        country: usize,
        province: Option<usize>,
        name: impl Into<String>,
        position: LocalPoint,
        class: CityClass,
        population: u32,
    ) -> Result<usize, WorldError> {
        if let Some(p) = province {
            if self.provinces.get(p).is_none_or(|p| p.country != country) {
                return Err(WorldError::UnknownProvince(p));
            }
        }
        let index = self.cities.len();
        let owner = self
            .countries
            .get_mut(country)
            .ok_or(WorldError::UnknownCountry(country))?;
        if class == CityClass::CountryCapital && owner.capital.is_none() {
            owner.capital = Some(index);
        }
        self.cities.push(City {
            index,
            name: name.into(),
            country,
            province,
            position,
            class,
            population,
        });
        Ok(index)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn country(&self, index: usize) -> Option<&Country> {
        self.countries.get(index)
    }

    pub fn province(&self, index: usize) -> Option<&Province> {
        self.provinces.get(index)
    }

    pub fn city(&self, index: usize) -> Option<&City> {
        self.cities.get(index)
    }

    pub fn country_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn province_index(&self, country: usize, name: &str) -> Option<usize> {
        let owner = self.countries.get(country)?;
        owner
            .provinces
            .iter()
            .copied()
            .find(|&p| self.provinces[p].name == name)
    }

    /// First city with `name`, optionally restricted to one country.
    pub fn city_index(&self, name: &str, country: Option<usize>) -> Option<usize> {
        self.cities
            .iter()
            .find(|c| c.name == name && country.is_none_or(|k| c.country == k))
            .map(|c| c.index)
    }

    pub fn cities_of(&self, country: usize) -> impl Iterator<Item = &City> + '_ {
        self.cities.iter().filter(move |c| c.country == country)
    }

    /// Order in which hit-testing considers countries.
    pub fn country_priority(&self) -> &[usize] {
        &self.priority
    }

    /// Installs a custom hit-test order; must be a permutation of all
    /// country indices.
    pub fn set_country_priority(&mut self, order: Vec<usize>) -> Result<(), WorldError> {
        if order.len() != self.countries.len() {
            warn!(got = order.len(), expected = self.countries.len(), "rejected country priority");
            return Err(WorldError::PriorityLength {
                got: order.len(),
                expected: self.countries.len(),
            });
        }
        let mut seen = vec![false; order.len()];
        for &i in &order {
            match seen.get_mut(i) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    warn!(country = i, "rejected country priority");
                    return Err(WorldError::PriorityNotPermutation(i));
                }
            }
        }
        self.priority = order;
        self.custom_priority = true;
        Ok(())
    }

    /// Back to the default order: smaller total area first, so enclaves win
    /// over the countries that surround them.
    pub fn reset_country_priority(&mut self) {
        self.custom_priority = false;
        self.rebuild_default_priority();
    }

    fn rebuild_default_priority(&mut self) {
        let areas: Vec<f64> = self.countries.iter().map(Country::area).collect();
        let mut order: Vec<usize> = (0..self.countries.len()).collect();
        order.sort_by(|&a, &b| cmp_key_then_index((areas[a], a), (areas[b], b)));
        self.priority = order;
    }

    pub fn set_country_hidden(&mut self, country: usize, hidden: bool) -> Result<(), WorldError> {
        let c = self
            .countries
            .get_mut(country)
            .ok_or(WorldError::UnknownCountry(country))?;
        c.hidden = hidden;
        Ok(())
    }

    /// Returns `false` if the country or region does not exist.
    pub fn set_region_material(
        &mut self,
        country: usize,
        region: usize,
        material: Option<MaterialId>,
    ) -> bool {
        match self
            .countries
            .get_mut(country)
            .and_then(|c| c.regions.get_mut(region))
        {
            Some(r) => {
                r.set_display_material(material);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn world() -> MapWorld {
        let mut w = MapWorld::new();
        w.add_country("Big", "Europe", vec![square(0.0, 0.0, 0.2)]).unwrap();
        w.add_country("Tiny", "Europe", vec![square(0.0, 0.0, 0.01)]).unwrap();
        w.add_country("Mid", "Asia", vec![square(0.3, 0.3, 0.05)]).unwrap();
        w
    }

    #[test]
    fn default_priority_is_smallest_area_first() {
        assert_eq!(world().country_priority(), &[1, 2, 0]);
    }

    #[test]
    fn custom_priority_must_be_a_permutation() {
        let mut w = world();
        assert_eq!(
            w.set_country_priority(vec![0, 1]),
            Err(WorldError::PriorityLength { got: 2, expected: 3 })
        );
        assert_eq!(
            w.set_country_priority(vec![0, 0, 1]),
            Err(WorldError::PriorityNotPermutation(0))
        );
        assert_eq!(
            w.set_country_priority(vec![0, 5, 1]),
            Err(WorldError::PriorityNotPermutation(5))
        );
        w.set_country_priority(vec![2, 0, 1]).unwrap();
        assert_eq!(w.country_priority(), &[2, 0, 1]);

        w.reset_country_priority();
        assert_eq!(w.country_priority(), &[1, 2, 0]);
    }

    #[test]
    fn lookups_by_name() {
        let mut w = world();
        let p = w.add_province(2, "North", vec![square(0.3, 0.32, 0.02)]).unwrap();
        let c = w
            .add_city(2, Some(p), "Capital", LocalPoint::new(0.3, 0.3), CityClass::CountryCapital, 10)
            .unwrap();

        assert_eq!(w.country_index("Mid"), Some(2));
        assert_eq!(w.country_index("Nowhere"), None);
        assert_eq!(w.province_index(2, "North"), Some(p));
        assert_eq!(w.province_index(0, "North"), None);
        assert_eq!(w.city_index("Capital", Some(2)), Some(c));
        assert_eq!(w.city_index("Capital", Some(0)), None);
        assert_eq!(w.country(2).unwrap().capital, Some(c));
        assert_eq!(w.cities_of(2).count(), 1);
    }

    #[test]
    fn rejects_bad_references() {
        let mut w = world();
        assert_eq!(
            w.add_province(9, "X", Vec::new()),
            Err(WorldError::UnknownCountry(9))
        );
        assert_eq!(
            w.add_city(0, Some(3), "X", LocalPoint::ORIGIN, CityClass::Ordinary, 0),
            Err(WorldError::UnknownProvince(3))
        );
        assert_eq!(
            w.add_country("Big", "", Vec::new()),
            Err(WorldError::DuplicateCountry("Big".into()))
        );
    }

    #[test]
    fn hidden_flag_and_materials() {
        let mut w = world();
        w.set_country_hidden(1, true).unwrap();
        assert!(w.country(1).unwrap().hidden);
        assert!(w.set_region_material(0, 0, Some(MaterialId(1))));
        assert!(!w.set_region_material(0, 4, None));
    }
}
