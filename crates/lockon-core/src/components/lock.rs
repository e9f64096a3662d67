//! Lock components: the lock machine itself and the systems that follow it.

use hecs::Entity;
use lockon_logic::config::{CameraTrackConfig, CycleInputConfig, DodgeConfig, LockConfig};
use lockon_logic::input::CycleGate;
use lockon_logic::machine::LockMachine;

/// Lock-on capability. An entity carrying this can both lock onto others
/// (unless receive-only) and be locked onto while `lockable` is set.
#[derive(Debug)]
pub struct LockOn {
    pub machine: LockMachine<Entity>,
    config: LockConfig,
    /// Whether other entities may currently lock onto this one
    pub lockable: bool,
}

impl LockOn {
    pub fn new(config: LockConfig) -> Self {
        Self {
            machine: LockMachine::new(),
            config,
            lockable: true,
        }
    }

    /// A pure lock target: never ticked, only qualifies for selection.
    pub fn target() -> Self {
        Self::new(LockConfig::receive_only())
    }

    pub fn with_lockable(mut self, lockable: bool) -> Self {
        self.lockable = lockable;
        self
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }
}

impl Default for LockOn {
    fn default() -> Self {
        Self::new(LockConfig::default())
    }
}

/// Turns the owner's control rotation toward its locked target.
#[derive(Debug, Clone, Copy)]
pub struct CameraTracker {
    pub config: CameraTrackConfig,
    /// Current lock, mirrored from the owner's `LockOn`
    pub target: Option<Entity>,
    /// `use_control_rotation` to restore when the lock ends
    pub default_use_control_rotation: bool,
}

impl CameraTracker {
    pub fn new(config: CameraTrackConfig) -> Self {
        Self {
            config,
            target: None,
            default_use_control_rotation: false,
        }
    }
}

impl Default for CameraTracker {
    fn default() -> Self {
        Self::new(CameraTrackConfig::default())
    }
}

/// Routes turn input to view rotation or lock cycling.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockDriver {
    pub gate: CycleGate,
    /// Mirrored from the owner's `LockOn`
    pub locked_on: bool,
}

impl LockDriver {
    pub fn new(config: &CycleInputConfig) -> Self {
        Self {
            gate: CycleGate::new(config),
            locked_on: false,
        }
    }
}

/// Dodge that bends side-steps around the locked target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dodge {
    pub config: DodgeConfig,
    /// Mirrored from the owner's `LockOn`
    pub target: Option<Entity>,
}

impl Dodge {
    pub fn new(config: DodgeConfig) -> Self {
        Self { config, target: None }
    }
}
