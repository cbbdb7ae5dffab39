pub mod map_data;
pub mod map_loader;
pub mod packed;

pub use map_data::*;
pub use map_loader::*;
pub use packed::*;
