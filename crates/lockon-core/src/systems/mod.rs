//! Systems - logic that operates on components

mod camera;
mod dodge;
mod driver;
mod lock;

pub use camera::*;
pub use dodge::*;
pub use driver::*;
pub use lock::*;
