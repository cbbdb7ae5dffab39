pub mod config;
pub mod controller;
pub mod fly_to;
pub mod input;
pub mod limits;

pub use config::*;
pub use controller::*;
pub use fly_to::*;
pub use input::*;
pub use limits::*;
