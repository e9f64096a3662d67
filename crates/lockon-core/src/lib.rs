//! Lock-On Core - ECS target acquisition and lock-driven behaviour
//!
//! Characters sweep a sphere in front of them, pick the closest lockable
//! entity, and keep that lock healthy every frame: a target that turns
//! unlockable hands the lock to the next closer one, a target that goes away
//! ends it.
//!
//! # Architecture
//!
//! Built on `hecs`, the same way as the rest of the game:
//! - **Components**: `LockOn` carries the lock machine, `Transform` and
//!   `Collider` feed the sweep, `CameraTracker`, `LockDriver` and `Dodge`
//!   follow lock changes
//! - **Query**: [`query::SpatialQuery`] is the one thing needed from physics
//! - **Systems**: begin/end/cycle plus the per-frame self-check and camera
//!   tracking
//!
//! # Example
//!
//! ```rust
//! use lockon_core::prelude::*;
//!
//! let mut engine = LockOnEngine::new();
//! let settings = LockOnSettings::default();
//!
//! let hero = engine.spawn_character(Vec3::ZERO, Vec3::X, &settings);
//! let grunt = engine.spawn_target(Vec3::new(500.0, 0.0, 0.0), 40.0);
//!
//! assert!(engine.begin_lock_on(hero));
//! assert_eq!(engine.locked_target(hero), Some(grunt));
//!
//! engine.update(1.0 / 60.0);
//! ```

pub mod capability;
pub mod components;
pub mod engine;
pub mod query;
pub mod systems;
pub mod trace;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::LockOnEngine;
    pub use crate::query::{SpatialQuery, WorldSweep};
    pub use lockon_logic::config::LockOnSettings;
    pub use lockon_logic::input::{TurnAction, TurnAxis};
    pub use lockon_logic::math::{Rotator, Vec3};
    pub use lockon_logic::{LockError, TickOutcome};
}
