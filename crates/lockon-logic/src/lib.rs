//! Pure lock-on targeting logic.
//!
//! Everything here works on plain data: target handles are any `Copy + Eq`
//! type and candidates arrive as already-traced lists. The ECS glue that
//! feeds it from a world lives in `lockon-core`.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`camera`] | Look-at rotation and shortest-path rotator interpolation |
//! | [`config`] | Lock sweep geometry and follow-system settings (JSON) |
//! | [`dodge`] | Side-step correction around a locked target |
//! | [`error`] | Lock failure taxonomy and config errors |
//! | [`input`] | Turn-input gate that turns stick flicks into lock cycles |
//! | [`machine`] | Lock state machine with ordered change listeners |
//! | [`math`] | `Vec3` / `Rotator` (Z-up, degrees) |
//! | [`ranking`] | Stable closest-first candidate ranking |
//! | [`selector`] | Floored-modulo cyclic index walk |
//! | [`sweep`] | Swept-sphere intersection and sweep segment projection |

pub mod camera;
pub mod config;
pub mod dodge;
pub mod error;
pub mod input;
pub mod machine;
pub mod math;
pub mod ranking;
pub mod selector;
pub mod sweep;

pub use error::{ConfigError, LockError};
pub use machine::{ListenerId, LockMachine, LockState, TargetStatus, TickOutcome};
pub use math::{Rotator, Vec3};
