pub mod camera;
pub mod collider;
pub mod projection;
pub mod render_target;
pub mod resolver;

pub use camera::*;
pub use collider::*;
pub use projection::*;
pub use render_target::*;
pub use resolver::*;
