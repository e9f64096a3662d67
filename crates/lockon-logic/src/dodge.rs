//! Dodge direction correction while locked on.
//!
//! Side-steps relative to a locked target are bent 45 degrees so the dodge
//! arcs around the target instead of drifting away from it.

use crate::math::{normalize_axis, Vec3};

/// Yaw window, in degrees, that counts as a side-step.
pub const SIDE_STEP_MIN: f32 = 50.0;
pub const SIDE_STEP_MAX: f32 = 105.0;
pub const SIDE_STEP_CORRECTION: f32 = 45.0;

/// Launch velocity for a dodge.
///
/// `direction` falls back to `facing` when it is (nearly) zero. With a
/// `target`, a dodge whose yaw sits 50..=105 degrees clockwise of the
/// direction to the target is rotated +45 degrees, and the mirrored window
/// rotates -45 degrees.
pub fn dodge_velocity(
    position: Vec3,
    facing: Vec3,
    direction: Vec3,
    target: Option<Vec3>,
    strength: f32,
) -> Vec3 {
    let mut launch = direction.normalize();
    if launch.is_nearly_zero() {
        launch = facing.normalize();
    }

    if let Some(target) = target {
        let toward = (target - position).normalize();
        if !toward.is_nearly_zero() {
            let difference = normalize_axis(toward.rotation().yaw - launch.rotation().yaw);
            if (SIDE_STEP_MIN..=SIDE_STEP_MAX).contains(&difference) {
                launch = launch.rotate_about_z(SIDE_STEP_CORRECTION);
            } else if (-SIDE_STEP_MAX..=-SIDE_STEP_MIN).contains(&difference) {
                launch = launch.rotate_about_z(-SIDE_STEP_CORRECTION);
            }
        }
    }

    launch * strength
}
