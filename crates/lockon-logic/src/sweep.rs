//! Swept-sphere intersection tests.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Shape swept along the query path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SweepShape {
    Sphere { radius: f32 },
}

impl SweepShape {
    pub fn sphere(radius: f32) -> Self {
        SweepShape::Sphere { radius }
    }

    /// Radius the shape adds around the swept segment.
    pub fn inflation(&self) -> f32 {
        match self {
            SweepShape::Sphere { radius } => radius.max(0.0),
        }
    }
}

/// Near and far points of a sweep projected from `origin` along `forward`.
///
/// Returns `None` when `forward` has no usable direction.
pub fn sweep_segment(origin: Vec3, forward: Vec3, near: f32, far: f32) -> Option<(Vec3, Vec3)> {
    let dir = forward.normalize();
    if dir.is_nearly_zero() {
        return None;
    }
    Some((origin + dir * near, origin + dir * far))
}

/// Time of first contact, in `[0, 1]`, of a sphere of `sweep_radius` moving
/// from `from` to `to` against a static sphere at `center`.
///
/// Starting in overlap reports time 0.
pub fn sweep_sphere_vs_sphere(
    from: Vec3,
    to: Vec3,
    sweep_radius: f32,
    center: Vec3,
    radius: f32,
) -> Option<f32> {
    let reach = sweep_radius.max(0.0) + radius.max(0.0);
    let start = from - center;
    let c = start.length_squared() - reach * reach;
    if c <= 0.0 {
        return Some(0.0);
    }

    let d = to - from;
    let a = d.length_squared();
    if a <= f32::EPSILON {
        return None;
    }

    let b = 2.0 * d.dot(&start);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let t = (-b - disc.sqrt()) / (2.0 * a);
    if (0.0..=1.0).contains(&t) {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hits_sphere_on_path() {
        let t = sweep_sphere_vs_sphere(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            1.0,
            Vec3::new(5.0, 0.0, 0.0),
            1.0,
        )
        .unwrap();
        // contact when the centers are 2 apart, at x = 3
        assert_relative_eq!(t, 0.3, epsilon = 1e-5);
    }

    #[test]
    fn grazes_within_radius() {
        let hit = sweep_sphere_vs_sphere(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            1.0,
            Vec3::new(5.0, 1.9, 0.0),
            1.0,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn misses_sphere_off_path() {
        let hit = sweep_sphere_vs_sphere(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            1.0,
            Vec3::new(5.0, 2.5, 0.0),
            0.25,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn misses_behind_start_and_past_end() {
        let from = Vec3::ZERO;
        let to = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(sweep_sphere_vs_sphere(from, to, 1.0, Vec3::new(-5.0, 0.0, 0.0), 1.0), None);
        assert_eq!(sweep_sphere_vs_sphere(from, to, 1.0, Vec3::new(15.0, 0.0, 0.0), 1.0), None);
    }

    #[test]
    fn initial_overlap_is_time_zero() {
        let hit = sweep_sphere_vs_sphere(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            2.0,
            Vec3::new(0.5, 0.0, 0.0),
            0.5,
        );
        assert_eq!(hit, Some(0.0));
    }

    #[test]
    fn segment_from_forward() {
        let (near, far) = sweep_segment(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 3.0, 10.0).unwrap();
        assert_eq!(near, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(far, Vec3::new(10.0, 0.0, 0.0));
        assert!(sweep_segment(Vec3::ZERO, Vec3::ZERO, 3.0, 10.0).is_none());
    }
}
