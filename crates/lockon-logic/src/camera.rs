//! Camera tracking math for a locked target.

use crate::config::CameraTrackConfig;
use crate::math::{Rotator, Vec3};

/// Rotation that looks from `from` toward `to`.
pub fn look_at(from: Vec3, to: Vec3) -> Rotator {
    (to - from).normalize().rotation()
}

/// Interpolate `current` toward `target` at `speed`, taking the short way
/// around on every axis.
///
/// Speed zero or less snaps to `target`. The step fraction is clamped to
/// `[0, 1]`, so a long frame never overshoots.
pub fn rinterp_to(current: Rotator, target: Rotator, delta_seconds: f32, speed: f32) -> Rotator {
    if speed <= 0.0 {
        return target;
    }
    let delta = target.delta(&current);
    if delta.is_nearly_zero(1.0e-4) {
        return target;
    }
    let alpha = (delta_seconds * speed).clamp(0.0, 1.0);
    (current + delta * alpha).normalized()
}

/// New control rotation for one tracking step toward `target_pos`.
///
/// The offset is part of the rotation being approached, so it settles at
/// look-at plus offset instead of piling up frame after frame.
pub fn track_step(
    control: Rotator,
    camera_pos: Vec3,
    target_pos: Vec3,
    delta_seconds: f32,
    config: &CameraTrackConfig,
) -> Rotator {
    let desired = (look_at(camera_pos, target_pos) + config.offset).normalized();
    rinterp_to(control, desired, delta_seconds, config.track_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn look_at_along_axes() {
        let r = look_at(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0));
        assert_relative_eq!(r.yaw, 90.0, epsilon = 1e-4);
        assert_relative_eq!(r.pitch, 0.0, epsilon = 1e-4);

        let r = look_at(Vec3::ZERO, Vec3::new(10.0, 0.0, 10.0));
        assert_relative_eq!(r.yaw, 0.0, epsilon = 1e-4);
        assert_relative_eq!(r.pitch, 45.0, epsilon = 1e-4);
    }

    #[test]
    fn interp_moves_fraction_of_delta() {
        let r = rinterp_to(Rotator::ZERO, Rotator::new(0.0, 90.0, 0.0), 0.125, 4.0);
        assert_relative_eq!(r.yaw, 45.0, epsilon = 1e-4);
    }

    #[test]
    fn interp_never_overshoots() {
        let r = rinterp_to(Rotator::ZERO, Rotator::new(10.0, 90.0, 0.0), 5.0, 4.0);
        assert_relative_eq!(r.yaw, 90.0, epsilon = 1e-4);
        assert_relative_eq!(r.pitch, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn interp_crosses_the_seam() {
        let r = rinterp_to(
            Rotator::new(0.0, 170.0, 0.0),
            Rotator::new(0.0, -170.0, 0.0),
            0.25,
            2.0,
        );
        // 20 degree gap, half of it covered, across +-180
        assert_relative_eq!(r.yaw, 180.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_speed_snaps() {
        let target = Rotator::new(5.0, 6.0, 7.0);
        assert_eq!(rinterp_to(Rotator::ZERO, target, 0.016, 0.0), target);
    }

    #[test]
    fn track_step_applies_offset() {
        let config = CameraTrackConfig {
            offset: Rotator::new(-10.0, 0.0, 0.0),
            track_speed: 0.0,
        };
        let r = track_step(
            Rotator::ZERO,
            Vec3::ZERO,
            Vec3::new(0.0, -5.0, 0.0),
            0.016,
            &config,
        );
        assert_relative_eq!(r.yaw, -90.0, epsilon = 1e-4);
        assert_relative_eq!(r.pitch, -10.0, epsilon = 1e-4);
    }

    #[test]
    fn track_step_offset_settles() {
        let config = CameraTrackConfig {
            offset: Rotator::new(-10.0, 0.0, 0.0),
            track_speed: 4.0,
        };
        let target = Vec3::new(100.0, 0.0, 0.0);
        let mut control = Rotator::ZERO;
        for _ in 0..600 {
            control = track_step(control, Vec3::ZERO, target, 1.0 / 60.0, &config);
        }
        assert_relative_eq!(control.pitch, -10.0, epsilon = 1e-2);
        assert_relative_eq!(control.yaw, 0.0, epsilon = 1e-2);
    }
}
