pub mod calculator;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod subsystems;

pub use calculator::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use registry::*;
pub use subsystems::*;
