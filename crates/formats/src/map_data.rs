use std::fs;
use std::path::{Path, PathBuf};

use scene::CityClass;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted map: a JSON document whose geometry fields are packed strings
/// (see [`crate::packed`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapData {
    pub countries: Vec<CountryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provinces: Vec<ProvinceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cities: Vec<CityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    #[serde(default)]
    pub continent: String,
    /// Packed multi-region geometry.
    pub regions: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    pub name: String,
    /// Owning country name.
    pub country: String,
    pub regions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Packed `"x,y"` point.
    pub position: String,
    #[serde(default)]
    pub class: CityClass,
    #[serde(default)]
    pub population: u32,
}

#[derive(Debug, Error)]
pub enum MapDataError {
    #[error("failed to read map {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid map json: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapData {
    pub fn from_json_str(payload: &str) -> Result<Self, MapDataError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapDataError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| MapDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn optional_sections_default() {
        let data = MapData::from_json_str(
            r#"{"countries":[{"name":"A","regions":"0,0;1,0;1,1"}]}"#,
        )
        .unwrap();
        assert_eq!(data.countries.len(), 1);
        assert_eq!(data.countries[0].continent, "");
        assert!(!data.countries[0].hidden);
        assert!(data.provinces.is_empty());
        assert!(data.cities.is_empty());
    }

    #[test]
    fn city_class_uses_snake_case() {
        let data = MapData::from_json_str(
            r#"{"countries":[],"cities":[{"name":"C","country":"A","position":"0,0","class":"country_capital"}]}"#,
        )
        .unwrap();
        assert_eq!(data.cities[0].class, CityClass::CountryCapital);
        assert_eq!(data.cities[0].province, None);
    }

    #[test]
    fn json_round_trip() {
        let data = MapData {
            countries: vec![CountryRecord {
                name: "A".into(),
                continent: "Europe".into(),
                regions: "0,0;1,0;1,1".into(),
                hidden: true,
            }],
            provinces: Vec::new(),
            cities: Vec::new(),
        };
        let text = data.to_json_string_pretty().unwrap();
        assert_eq!(MapData::from_json_str(&text).unwrap(), data);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MapData::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
