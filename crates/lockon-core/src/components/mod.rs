//! Component definitions for the lock-on world.
//!
//! Components are plain data attached to entities; behavior lives in systems.

mod lock;
mod spatial;

pub use lock::*;
pub use spatial::*;
