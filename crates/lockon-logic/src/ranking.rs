//! Distance ranking of lock candidates.

use std::cmp::Ordering;

use crate::math::Vec3;

/// A target handle paired with the position it was found at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<T> {
    pub target: T,
    pub position: Vec3,
}

impl<T> Candidate<T> {
    pub fn new(target: T, position: Vec3) -> Self {
        Self { target, position }
    }
}

/// Sort candidates by squared distance from `origin`, closest first.
///
/// The sort is stable: candidates at equal distance keep their input order.
/// Candidates whose distance is NaN sort after every finite one.
pub fn rank_by_distance<T: Copy>(origin: Vec3, candidates: &[Candidate<T>]) -> Vec<T> {
    let mut keyed: Vec<(T, f32)> = candidates
        .iter()
        .map(|c| (c.target, origin.distance_squared(&c.position)))
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|a, b| compare_distance(a.1, b.1));
    keyed.into_iter().map(|(target, _)| target).collect()
}

fn compare_distance(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}
