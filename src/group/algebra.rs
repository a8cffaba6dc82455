use std::collections::HashSet;
use std::ops::{Add, Sub};
use std::path::Path;
use std::sync::Arc;

use super::model::TrajGroup;

// ---------------------------------------------------------------------------
// Union / difference
// ---------------------------------------------------------------------------

/// Union: members of `self` then members of `rhs`, deduplicated by path.
/// The result is named `<self>_plus_<rhs>`.
impl Add for &TrajGroup {
    type Output = TrajGroup;

    fn add(self, rhs: &TrajGroup) -> TrajGroup {
        TrajGroup::from_trajs(
            format!("{}_plus_{}", self.name, rhs.name),
            self.trajs.iter().chain(rhs.trajs.iter()).map(Arc::clone),
        )
    }
}

impl Add for TrajGroup {
    type Output = TrajGroup;

    fn add(self, rhs: TrajGroup) -> TrajGroup {
        &self + &rhs
    }
}

/// Difference: members of `self` whose path is not in `rhs`.
/// The result is named `<self>_minus_<rhs>`.
impl Sub for &TrajGroup {
    type Output = TrajGroup;

    fn sub(self, rhs: &TrajGroup) -> TrajGroup {
        let removed: HashSet<&Path> = rhs.paths().collect();
        TrajGroup::from_trajs(
            format!("{}_minus_{}", self.name, rhs.name),
            self.trajs
                .iter()
                .filter(|t| !removed.contains(t.path()))
                .map(Arc::clone),
        )
    }
}

impl Sub for TrajGroup {
    type Output = TrajGroup;

    fn sub(self, rhs: TrajGroup) -> TrajGroup {
        &self - &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::traj;

    fn group(name: &str, paths: &[&str]) -> TrajGroup {
        let trajs: Vec<_> = paths.iter().map(|p| traj(p, &[1.0, 2.0])).collect();
        TrajGroup::new(name, trajs).unwrap()
    }

    #[test]
    fn union_is_commutative_on_membership() {
        let a = group("a", &["d/1", "d/2", "d/3"]);
        let b = group("b", &["d/3", "d/4"]);

        let ab = &a + &b;
        let ba = &b + &a;
        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 4);
        assert_eq!(ab.name(), "a_plus_b");
        assert_eq!(ba.name(), "b_plus_a");
    }

    #[test]
    fn union_merges_aggregates() {
        let a = group("a", &["d/1"]);
        let b = group("b", &["d/2"]);
        let ab = a + b;
        assert_eq!(ab.total("TEMP"), Some(6.0));
        assert_eq!(ab.max("TEMP"), Some(2.0));
    }

    #[test]
    fn difference_undoes_disjoint_union() {
        let a = group("a", &["d/1", "d/2"]);
        let b = group("b", &["e/1", "e/2", "e/3"]);

        let round_trip = &(&a + &b) - &b;
        assert_eq!(round_trip, a);
        assert_eq!(round_trip.name(), "a_plus_b_minus_b");
        assert_eq!(round_trip.total("TEMP"), a.total("TEMP"));
    }

    #[test]
    fn difference_keeps_order_of_left_operand() {
        let a = group("a", &["d/3", "d/1", "d/2"]);
        let b = group("b", &["d/1"]);
        let diff = a - b;
        let paths: Vec<&Path> = diff.paths().collect();
        assert_eq!(paths, [Path::new("d/3"), Path::new("d/2")]);
    }
}
