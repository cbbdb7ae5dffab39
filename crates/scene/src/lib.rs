pub mod components;
pub mod entity;
pub mod highlight;
pub mod picking;
pub mod spatial;
pub mod world;

pub use entity::*;
pub use highlight::*;
pub use picking::*;
pub use world::*;
