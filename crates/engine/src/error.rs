use formats::MapLoadError;
use scene::WorldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown country {0:?}")]
    UnknownCountry(String),
    #[error("unknown province {province:?} in country {country:?}")]
    UnknownProvince { country: String, province: String },
    #[error("unknown city {0:?}")]
    UnknownCity(String),
    #[error("subsystem {0} is unavailable")]
    Subsystem(&'static str),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Load(#[from] MapLoadError),
}
