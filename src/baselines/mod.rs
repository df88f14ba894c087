//! Evolutionary baselines sharing the CA-ALNS evaluator.
//!
//! Both baselines score candidates through the same [`CachedEvaluator`]
//! with the same budget and final penalty weights as CA-ALNS, so results
//! are budget-equalized.
//!
//! - [`ga`]: steady-state genetic algorithm over (visiting order, owner)
//! - [`de`]: DE/rand/1/bin over random keys
//!
//! [`CachedEvaluator`]: crate::eval::CachedEvaluator

pub mod de;
pub mod ga;

use crate::error::Result;
use crate::eval::CachedEvaluator;
use crate::model::{Instance, RouteItem, Solution, SolutionMetrics};
use crate::problem::RoutingProblem;
use crate::result::RunResult;
use rand::seq::SliceRandom;
use rand::Rng;

pub use de::{DeConfig, DeRunner};
pub use ga::{GaConfig, GaRunner};

/// Result of a baseline run.
#[derive(Debug, Clone)]
pub struct BaselineResult {
    pub algorithm: &'static str,
    pub best: Solution,
    pub best_metrics: SolutionMetrics,
    /// Final-phase cost of `best`.
    pub fitness: f64,
    /// Offspring (GA) or trial vectors (DE) produced.
    pub iterations: usize,
    pub evaluations_used: usize,
    pub cache_hits: usize,
    pub seed: u64,
    pub wallclock_s: f64,
}

impl BaselineResult {
    /// Flat per-run record.
    pub fn to_run_result(&self) -> RunResult {
        RunResult::from_metrics(&self.best_metrics)
            .with_algorithm(self.algorithm)
            .with_seed(self.seed)
            .with_fitness(Some(self.fitness))
            .with_evaluations(self.evaluations_used)
            .with_wallclock(self.wallclock_s)
    }
}

/// Builds routes from a visiting order over target indices and the owning
/// vehicle index of each target.
///
/// Targets are appended to their owner's route in `order`. Owner indices
/// wrap around the fleet size.
pub(crate) fn decode(instance: &Instance, order: &[usize], owner: &[usize]) -> Solution {
    let mut solution = Solution::empty(instance);
    let m = instance.uavs.len();
    if m == 0 {
        return solution;
    }
    for &t in order {
        let (Some(target), Some(&o)) = (instance.targets.get(t), owner.get(t)) else {
            continue;
        };
        let uav = instance.uavs[o % m].id;
        if let Some(route) = solution.route_mut(uav) {
            let end = route.len() - 1;
            route.insert(end, RouteItem::target(target));
        }
    }
    solution
}

/// Encoding of the round-robin plan: instance order, target `i` owned by
/// vehicle `i mod m`.
pub(crate) fn round_robin_encoding(instance: &Instance) -> (Vec<usize>, Vec<usize>) {
    let n = instance.targets.len();
    let m = instance.uavs.len().max(1);
    ((0..n).collect(), (0..n).map(|i| i % m).collect())
}

/// A decoded and scored candidate.
#[derive(Debug, Clone)]
pub(crate) struct Scored {
    pub solution: Solution,
    pub metrics: SolutionMetrics,
    pub cost: f64,
}

/// Decodes `(order, owner)` and scores it under the final penalties.
pub(crate) fn evaluate_encoding(
    problem: &RoutingProblem,
    evaluator: &mut CachedEvaluator,
    order: &[usize],
    owner: &[usize],
) -> Result<Scored> {
    let solution = decode(problem.instance(), order, owner);
    let mut metrics = problem.measure(&solution);
    metrics.ensure_feasibility_flags();
    let cost = evaluator.evaluate(&metrics, problem.penalties())?;
    Ok(Scored {
        solution,
        metrics,
        cost,
    })
}

/// Random visiting order over `n` targets and random owners among `m`
/// vehicles.
pub(crate) fn random_encoding<R: Rng>(n: usize, m: usize, rng: &mut R) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    let owner = (0..n).map(|_| rng.random_range(0..m.max(1))).collect();
    (order, owner)
}
