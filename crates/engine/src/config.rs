use std::fs;
use std::path::{Path, PathBuf};

use navigation::NavigationConfig;
use scene::HitOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use viewport::{Projection, ViewportConfig};

/// World size of the map quad.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSpaceConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for MapSpaceConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 100.0,
        }
    }
}

/// Engine settings. Every section is optional in JSON and falls back to its
/// defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub map: MapSpaceConfig,
    /// Projection of the main camera.
    pub projection: Projection,
    pub navigation: NavigationConfig,
    pub viewport: ViewportConfig,
    pub hit_test: HitOptions,
    /// Drive hovering from the center of the view instead of the mouse
    /// (head-mounted or gamepad setups).
    pub pointer_at_viewport_center: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }
}
