pub mod coords;
pub mod geodesy;
pub mod plane;
pub mod precision;
pub mod vec;

pub use coords::*;
pub use geodesy::*;
pub use plane::*;
pub use precision::*;
pub use vec::*;
