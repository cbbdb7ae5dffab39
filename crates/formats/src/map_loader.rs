use std::path::Path;

use foundation::math::LocalPoint;
use scene::{MapWorld, Region, WorldError};
use thiserror::Error;
use tracing::info;

use crate::map_data::{MapData, MapDataError};
use crate::packed::{PackedError, decode_point, decode_regions};

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error(transparent)]
    Data(#[from] MapDataError),
    #[error("bad geometry for {kind} {name:?}: {source}")]
    Geometry {
        kind: &'static str,
        name: String,
        source: PackedError,
    },
    #[error("{kind} {name:?} references unknown country {country:?}")]
    UnknownCountry {
        kind: &'static str,
        name: String,
        country: String,
    },
    #[error("city {name:?} references unknown province {province:?}")]
    UnknownProvince { name: String, province: String },
    #[error(transparent)]
    World(#[from] WorldError),
}

pub fn load_world_from_path(path: impl AsRef<Path>) -> Result<MapWorld, MapLoadError> {
    let data = MapData::load(path)?;
    load_world(&data)
}

/// Decodes every packed geometry field and builds the world.
///
/// Nothing is returned unless the whole document decodes, so a bad record
/// never leaves a half-built world behind.
pub fn load_world(data: &MapData) -> Result<MapWorld, MapLoadError> {
    let mut world = MapWorld::new();

    for record in &data.countries {
        let regions = decode_shape("country", &record.name, &record.regions)?;
        let index = world.add_country(record.name.clone(), record.continent.clone(), regions)?;
        if record.hidden {
            world.set_country_hidden(index, true)?;
        }
    }

    for record in &data.provinces {
        let country = country_ref(&world, "province", &record.name, &record.country)?;
        let regions = decode_shape("province", &record.name, &record.regions)?;
        world.add_province(country, record.name.clone(), regions)?;
    }

    for record in &data.cities {
        let country = country_ref(&world, "city", &record.name, &record.country)?;
        let province = match &record.province {
            Some(p) => Some(world.province_index(country, p).ok_or_else(|| {
                MapLoadError::UnknownProvince {
                    name: record.name.clone(),
                    province: p.clone(),
                }
            })?),
            None => None,
        };
        let position = decode_point(&record.position).map_err(|source| MapLoadError::Geometry {
            kind: "city",
            name: record.name.clone(),
            source,
        })?;
        world.add_city(
            country,
            province,
            record.name.clone(),
            LocalPoint(position),
            record.class,
            record.population,
        )?;
    }

    info!(
        countries = world.countries().len(),
        provinces = world.provinces().len(),
        cities = world.cities().len(),
        "map loaded"
    );
    Ok(world)
}

fn decode_shape(kind: &'static str, name: &str, packed: &str) -> Result<Vec<Region>, MapLoadError> {
    let rings = decode_regions(packed).map_err(|source| MapLoadError::Geometry {
        kind,
        name: name.to_string(),
        source,
    })?;
    Ok(rings.into_iter().map(Region::new).collect())
}

fn country_ref(
    world: &MapWorld,
    kind: &'static str,
    name: &str,
    country: &str,
) -> Result<usize, MapLoadError> {
    world
        .country_index(country)
        .ok_or_else(|| MapLoadError::UnknownCountry {
            kind,
            name: name.to_string(),
            country: country.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_data::{CityRecord, CountryRecord, ProvinceRecord};
    use crate::packed::encode_polygon;
    use foundation::math::DVec2;
    use scene::CityClass;

    fn square(cx: f64, cy: f64, half: f64) -> String {
        encode_polygon(&[
            DVec2::new(cx - half, cy - half),
            DVec2::new(cx + half, cy - half),
            DVec2::new(cx + half, cy + half),
            DVec2::new(cx - half, cy + half),
        ])
    }

    fn sample() -> MapData {
        MapData {
            countries: vec![
                CountryRecord {
                    name: "A".into(),
                    continent: "Europe".into(),
                    regions: square(0.0, 0.0, 0.1),
                    hidden: false,
                },
                CountryRecord {
                    name: "B".into(),
                    continent: "Europe".into(),
                    regions: square(0.35, 0.35, 0.05),
                    hidden: true,
                },
            ],
            provinces: vec![ProvinceRecord {
                name: "A-North".into(),
                country: "A".into(),
                regions: square(0.0, 0.05, 0.05),
            }],
            cities: vec![CityRecord {
                name: "A-Town".into(),
                country: "A".into(),
                province: Some("A-North".into()),
                position: "0,250000".into(),
                class: CityClass::CountryCapital,
                population: 1000,
            }],
        }
    }

    #[test]
    fn builds_world_with_links() {
        let world = load_world(&sample()).unwrap();
        assert_eq!(world.countries().len(), 2);
        assert!(world.country(1).unwrap().hidden);
        assert_eq!(world.country(0).unwrap().provinces, vec![0]);
        let city = world.city(0).unwrap();
        assert_eq!(city.province, Some(0));
        assert_eq!(city.position, LocalPoint::new(0.0, 0.05));
        assert_eq!(world.country(0).unwrap().capital, Some(0));
    }

    #[test]
    fn unknown_references_fail_the_load() {
        let mut data = sample();
        data.cities[0].country = "Z".into();
        let err = load_world(&data).unwrap_err();
        assert!(matches!(err, MapLoadError::UnknownCountry { kind: "city", .. }));

        let mut data = sample();
        data.cities[0].province = Some("Nope".into());
        assert!(matches!(
            load_world(&data),
            Err(MapLoadError::UnknownProvince { .. })
        ));
    }

    #[test]
    fn bad_geometry_names_the_entity() {
        let mut data = sample();
        data.countries[1].regions = "0,0;x,1;2,2".into();
        let err = load_world(&data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad geometry for country \"B\": invalid number \"x\""
        );
    }
}
