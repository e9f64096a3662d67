//! Error types for lock operations and configuration.

use thiserror::Error;

/// Why a lock operation did not produce a lock.
///
/// Every variant is recovered locally: the machine either stays put or
/// degrades to unlocked. The boolean operations are built on top of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LockError {
    /// The trace pipeline found no lockable candidates.
    #[error("no lockable targets in range")]
    QueryEmpty,
    /// The locked target is gone or can no longer be locked.
    #[error("locked target is no longer valid")]
    TargetInvalidated,
    /// The operation is not allowed from the current state.
    #[error("operation not valid in the current lock state")]
    InvalidTransition,
}

/// Errors that can occur while building or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("far distance {far} is closer than near distance {near}")]
    InvertedRange { near: f32, far: f32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
