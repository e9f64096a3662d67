//! Configuration for lock-on targeting and the systems that follow a lock.
//!
//! All configs deserialize from JSON with per-field defaults, so a file only
//! needs the values it changes:
//!
//! ```
//! use lockon_logic::config::LockOnSettings;
//!
//! let json = r#"{ "lock": { "far_distance": 1500.0 } }"#;
//! let settings = LockOnSettings::from_json_str(json).unwrap();
//! assert_eq!(settings.lock.far_distance(), 1500.0);
//! assert_eq!(settings.lock.near_distance(), 300.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::Rotator;

pub const DEFAULT_NEAR_DISTANCE: f32 = 300.0;
pub const DEFAULT_FAR_DISTANCE: f32 = 1000.0;
pub const DEFAULT_LOCK_RADIUS: f32 = 250.0;
pub const DEFAULT_TRACK_SPEED: f32 = 4.0;
pub const DEFAULT_CYCLE_SENSITIVITY: f32 = 0.25;
pub const DEFAULT_DODGE_STRENGTH: f32 = 1000.0;

/// Sweep geometry for one lock machine. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLockConfig")]
pub struct LockConfig {
    near_distance: f32,
    far_distance: f32,
    radius: f32,
    receive_only: bool,
}

/// Unchecked form used for deserialization.
#[derive(Deserialize)]
#[serde(default)]
struct RawLockConfig {
    near_distance: f32,
    far_distance: f32,
    radius: f32,
    receive_only: bool,
}

impl Default for RawLockConfig {
    fn default() -> Self {
        Self {
            near_distance: DEFAULT_NEAR_DISTANCE,
            far_distance: DEFAULT_FAR_DISTANCE,
            radius: DEFAULT_LOCK_RADIUS,
            receive_only: false,
        }
    }
}

impl TryFrom<RawLockConfig> for LockConfig {
    type Error = ConfigError;

    fn try_from(raw: RawLockConfig) -> Result<Self, Self::Error> {
        LockConfig::new(raw.near_distance, raw.far_distance, raw.radius, raw.receive_only)
    }
}

impl LockConfig {
    pub fn new(
        near_distance: f32,
        far_distance: f32,
        radius: f32,
        receive_only: bool,
    ) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("near_distance", near_distance),
            ("far_distance", far_distance),
            ("radius", radius),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if near_distance < 0.0 {
            return Err(ConfigError::Negative {
                field: "near_distance",
                value: near_distance,
            });
        }
        if far_distance < near_distance {
            return Err(ConfigError::InvertedRange {
                near: near_distance,
                far: far_distance,
            });
        }
        if radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(radius));
        }

        Ok(Self {
            near_distance,
            far_distance,
            radius,
            receive_only,
        })
    }

    /// A config for entities that only exist to be locked onto.
    pub fn receive_only() -> Self {
        Self {
            receive_only: true,
            ..Self::default()
        }
    }

    pub fn near_distance(&self) -> f32 {
        self.near_distance
    }

    pub fn far_distance(&self) -> f32 {
        self.far_distance
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Receive-only machines are never ticked.
    pub fn is_receive_only(&self) -> bool {
        self.receive_only
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            near_distance: DEFAULT_NEAR_DISTANCE,
            far_distance: DEFAULT_FAR_DISTANCE,
            radius: DEFAULT_LOCK_RADIUS,
            receive_only: false,
        }
    }
}

/// How a lock camera follows its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTrackConfig {
    /// Added to the look-at rotation every tick.
    pub offset: Rotator,
    /// Interpolation speed; zero or less snaps straight to the target.
    pub track_speed: f32,
}

impl Default for CameraTrackConfig {
    fn default() -> Self {
        Self {
            offset: Rotator::ZERO,
            track_speed: DEFAULT_TRACK_SPEED,
        }
    }
}

/// Dead zone for turning input used to cycle locks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleInputConfig {
    pub sensitivity: f32,
}

impl Default for CycleInputConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_CYCLE_SENSITIVITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeConfig {
    pub strength: f32,
}

impl Default for DodgeConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_DODGE_STRENGTH,
        }
    }
}

/// Everything a lock-on character needs, as loaded from a settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOnSettings {
    pub lock: LockConfig,
    pub camera: CameraTrackConfig,
    pub input: CycleInputConfig,
    pub dodge: DodgeConfig,
}

impl LockOnSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json);
        if let Err(e) = &settings {
            log::warn!("Rejected lock-on settings {}: {}", path.display(), e);
        }
        settings
    }

    /// Checks the fields `LockConfig` does not already guard.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("camera.track_speed", self.camera.track_speed),
            ("input.sensitivity", self.input.sensitivity),
            ("dodge.strength", self.dodge.strength),
        ];
        for (field, value) in checks {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if self.input.sensitivity < 0.0 {
            return Err(ConfigError::Negative {
                field: "input.sensitivity",
                value: self.input.sensitivity,
            });
        }
        if self.dodge.strength < 0.0 {
            return Err(ConfigError::Negative {
                field: "dodge.strength",
                value: self.dodge.strength,
            });
        }
        Ok(())
    }
}
