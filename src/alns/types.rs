//! Core traits for CA-ALNS.

use crate::model::{Instance, Node, Solution};
use rand::Rng;

/// A solution with some targets taken out, awaiting repair.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSolution {
    pub solution: Solution,
    /// Removed targets, in removal order.
    pub removed: Vec<Node>,
}

impl PartialSolution {
    pub fn new(solution: Solution) -> Self {
        Self {
            solution,
            removed: Vec::new(),
        }
    }
}

/// A destroy operator removes targets from a routing plan.
///
/// Destroy operators strip every rally waypoint before removing targets, so
/// the structure is rebuilt from scratch on each trial. The `degree`
/// parameter is the fraction of served targets to remove, in [0, 1]; at
/// least one target is removed when any is served.
///
/// # References
///
/// Ropke & Pisinger (2006), Section 2
pub trait DestroyOperator: Send + Sync {
    /// Returns a human-readable name for this operator.
    fn name(&self) -> &str;

    /// Removes part of the targets served by `solution`.
    fn destroy<R: Rng>(
        &self,
        instance: &Instance,
        solution: &Solution,
        degree: f64,
        rng: &mut R,
    ) -> PartialSolution;
}

/// A repair operator reinserts every removed target.
///
/// The returned plan serves every target of the instance exactly once when
/// the partial solution did so for the targets it kept.
///
/// # References
///
/// Ropke & Pisinger (2006), Section 2
pub trait RepairOperator: Send + Sync {
    /// Returns a human-readable name for this operator.
    fn name(&self) -> &str;

    /// Reinserts `partial.removed` into `partial.solution`.
    fn repair<R: Rng>(&self, instance: &Instance, partial: PartialSolution, rng: &mut R)
        -> Solution;
}

/// Number of targets to remove out of `served` for a destroy `degree`.
pub(crate) fn removal_count(served: usize, degree: f64) -> usize {
    if served == 0 {
        return 0;
    }
    let n = (served as f64 * degree.clamp(0.0, 1.0)).ceil() as usize;
    n.clamp(1, served)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_count() {
        assert_eq!(removal_count(0, 0.5), 0);
        assert_eq!(removal_count(10, 0.0), 1);
        assert_eq!(removal_count(10, 0.25), 3);
        assert_eq!(removal_count(10, 1.0), 10);
        assert_eq!(removal_count(3, 7.0), 3);
    }
}
