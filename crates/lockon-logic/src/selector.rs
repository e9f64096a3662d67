//! Cyclic index selection over a ranked candidate list.
//!
//! Offsets walk the list with floored modulo, so stepping back from the
//! closest candidate lands on the furthest one and stepping past the furthest
//! wraps to the closest.

/// Index reached by moving `offset` steps from `current` in a list of `count`.
///
/// Always in `[0, count)` for any offset, including large negative ones.
/// Returns `None` when the list is empty.
pub fn cycle_index(current: usize, offset: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    // i128 keeps `current + offset` exact for every usize/i64 pair.
    let count = count as i128;
    let next = (current as i128 + offset as i128).rem_euclid(count);
    Some(next as usize)
}

/// Position of `current` in `candidates`, then the element `offset` steps away.
pub fn cycle_from<T: PartialEq + Copy>(candidates: &[T], current: &T, offset: i64) -> Option<T> {
    let index = candidates.iter().position(|c| c == current)?;
    cycle_index(index, offset, candidates.len()).map(|i| candidates[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_backward_from_front() {
        assert_eq!(cycle_index(0, -1, 5), Some(4));
        assert_eq!(cycle_index(0, -1, 4), Some(3));
    }

    #[test]
    fn wraps_forward_from_back() {
        assert_eq!(cycle_index(3, 1, 4), Some(0));
    }

    #[test]
    fn steps_inside_range() {
        assert_eq!(cycle_index(1, 1, 4), Some(2));
        assert_eq!(cycle_index(2, -1, 4), Some(1));
        assert_eq!(cycle_index(2, 0, 4), Some(2));
    }

    #[test]
    fn large_offsets_stay_in_range() {
        for count in 1..8usize {
            for current in 0..count {
                for offset in [i64::MIN, i64::MIN + 1, -1_000_003, -17, 17, 1_000_003, i64::MAX] {
                    let index = cycle_index(current, offset, count).unwrap();
                    assert!(index < count, "count={count} current={current} offset={offset}");
                }
            }
        }
    }

    #[test]
    fn matches_floored_modulo() {
        // -7 mod 5 floors to 3, not the truncated -2
        assert_eq!(cycle_index(0, -7, 5), Some(3));
        assert_eq!(cycle_index(4, 6, 5), Some(0));
    }

    #[test]
    fn empty_list_has_no_index() {
        assert_eq!(cycle_index(0, 1, 0), None);
    }

    #[test]
    fn cycle_from_missing_current() {
        assert_eq!(cycle_from(&[1, 2, 3], &9, 1), None);
        assert_eq!(cycle_from(&[1, 2, 3], &1, -1), Some(3));
    }
}
