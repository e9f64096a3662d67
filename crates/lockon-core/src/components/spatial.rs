//! Spatial components: where things are and what can be hit.

use hecs::Entity;
use lockon_logic::math::{Rotator, Vec3};
use serde::{Deserialize, Serialize};

/// World-space placement of an entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Facing direction; need not be normalized
    pub forward: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::X,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn facing(mut self, forward: Vec3) -> Self {
        self.forward = forward;
        self
    }

    pub fn rotation(&self) -> Rotator {
        self.forward.rotation()
    }
}

/// Collision sphere centered on the entity's `Transform`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Collider {
    pub radius: f32,
    /// Only blocking colliders are reported by sweeps
    pub blocking: bool,
}

impl Collider {
    pub fn sphere(radius: f32) -> Self {
        Self {
            radius,
            blocking: true,
        }
    }

    pub fn overlap_only(radius: f32) -> Self {
        Self {
            radius,
            blocking: false,
        }
    }
}

/// Marks a collision primitive as belonging to another entity (its actor).
/// Hits on the primitive are reported against the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedTo(pub Entity);

/// View camera of a player-controlled entity.
///
/// Entities with a camera trace lock targets from the camera instead of
/// their own transform.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Camera {
    /// Camera position relative to the entity's `Transform`
    pub offset: Vec3,
}

/// Control rotation of a player-controlled entity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewController {
    pub control_rotation: Rotator,
    /// Whether the camera follows the control rotation
    pub use_control_rotation: bool,
}

impl ViewController {
    pub fn new(control_rotation: Rotator) -> Self {
        Self {
            control_rotation,
            use_control_rotation: false,
        }
    }

    pub fn add_yaw_input(&mut self, value: f32) {
        self.control_rotation.yaw += value;
        self.control_rotation = self.control_rotation.normalized();
    }

    pub fn add_pitch_input(&mut self, value: f32) {
        self.control_rotation.pitch = (self.control_rotation.pitch + value).clamp(-89.0, 89.0);
    }
}
