//! Budget-aware, cache-backed fitness evaluation.

use super::budget::EvaluationBudget;
use super::fitness::fitness_value;
use super::penalty::{PenaltyConfig, Phase};
use crate::error::Result;
use crate::model::SolutionMetrics;
use std::collections::HashMap;

/// Fitness evaluator shared by CA-ALNS and the baselines.
///
/// Costs are memoized under the metrics fingerprint and the penalty phase,
/// so a cache hit never consumes budget and a phase switch never serves a
/// stale warm-up cost. The cache is never evicted: its size is bounded by
/// the budget.
#[derive(Debug, Clone)]
pub struct CachedEvaluator {
    budget: EvaluationBudget,
    cache: HashMap<(String, Phase), f64>,
    cache_hits: usize,
}

impl CachedEvaluator {
    pub fn new(max_evaluations: usize) -> Self {
        Self {
            budget: EvaluationBudget::new(max_evaluations),
            cache: HashMap::new(),
            cache_hits: 0,
        }
    }

    /// Returns the cost of `metrics`, consuming one evaluation on a miss.
    ///
    /// # Errors
    ///
    /// [`CaAlnsError::EvaluationBudgetExceeded`](crate::CaAlnsError::EvaluationBudgetExceeded)
    /// when a miss occurs with the budget already spent.
    pub fn evaluate(
        &mut self,
        metrics: &SolutionMetrics,
        penalties: &PenaltyConfig,
    ) -> Result<f64> {
        let key = (metrics.fingerprint()?, penalties.phase);
        if let Some(&cost) = self.cache.get(&key) {
            self.cache_hits += 1;
            return Ok(cost);
        }
        self.budget.tick()?;
        let cost = fitness_value(metrics, penalties);
        self.cache.insert(key, cost);
        Ok(cost)
    }

    /// Evaluations consumed so far.
    pub fn used(&self) -> usize {
        self.budget.used()
    }

    pub fn max(&self) -> usize {
        self.budget.max()
    }

    pub fn remaining(&self) -> usize {
        self.budget.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.budget.is_exhausted()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{ConnectivityConfig, ConnectivityScreen};
    use crate::model::{Instance, Node, RouteItem, Solution, Uav};
    use crate::CaAlnsError;
    use std::collections::BTreeMap;

    fn metrics(travel: f64) -> SolutionMetrics {
        SolutionMetrics {
            total_travel: Some(travel),
            connected: Some(true),
            payload_ok: Some(true),
            battery_ok: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_hit_is_free() {
        let mut eval = CachedEvaluator::new(10);
        let p = PenaltyConfig::default();
        let a = eval.evaluate(&metrics(5.0), &p).unwrap();
        let b = eval.evaluate(&metrics(5.0), &p).unwrap();
        assert_eq!(a, b);
        assert_eq!(eval.used(), 1);
        assert_eq!(eval.cache_hits(), 1);
        assert_eq!(eval.cache_len(), 1);
    }

    #[test]
    fn test_differently_built_solutions_share_one_evaluation() {
        let inst = Instance::new(
            Node::new(0, 0.0, 0.0),
            vec![Node::new(1, 10.0, 0.0), Node::new(2, 0.0, 10.0)],
            vec![Uav::new(0), Uav::new(1)],
        );
        let depot = RouteItem::depot(&inst.depot);
        let route_a = vec![depot, RouteItem::target(&inst.targets[0]), depot];
        let route_b = vec![depot, RouteItem::target(&inst.targets[1]), depot];

        let mut forward = BTreeMap::new();
        forward.insert(0, route_a.clone());
        forward.insert(1, route_b.clone());
        let mut backward = BTreeMap::new();
        backward.insert(1, route_b);
        backward.insert(0, route_a);

        let screen = ConnectivityScreen::new(ConnectivityConfig::default());
        let m1 = screen.measure(&Solution { routes: forward }, &inst);
        let m2 = screen.measure(&Solution { routes: backward }, &inst);

        let mut eval = CachedEvaluator::new(5);
        let p = PenaltyConfig::default();
        eval.evaluate(&m1, &p).unwrap();
        eval.evaluate(&m2, &p).unwrap();
        assert_eq!(eval.used(), 1);
    }

    #[test]
    fn test_budget_overflow_after_max_distinct() {
        let mut eval = CachedEvaluator::new(3);
        let p = PenaltyConfig::default();
        for i in 0..3 {
            eval.evaluate(&metrics(i as f64), &p).unwrap();
        }
        // Cached entries stay available.
        assert!(eval.evaluate(&metrics(1.0), &p).is_ok());

        let err = eval.evaluate(&metrics(99.0), &p).unwrap_err();
        assert!(err.is_budget_exceeded());
        assert!(matches!(err, CaAlnsError::EvaluationBudgetExceeded { .. }));
        assert_eq!(eval.used(), 3);
        assert_eq!(eval.cache_len(), 3);
    }

    #[test]
    fn test_phase_is_part_of_the_key() {
        let mut eval = CachedEvaluator::new(10);
        let final_p = PenaltyConfig::default().with_hard_penalties(100.0);
        let warm_p = final_p.warmup(1.0, 0.5);
        let mut m = metrics(1.0);
        m.connected = Some(false);

        let warm = eval.evaluate(&m, &warm_p).unwrap();
        let full = eval.evaluate(&m, &final_p).unwrap();
        assert!(warm < full);
        assert_eq!(eval.used(), 2);
        assert_eq!(eval.cache_len(), 2);
    }

    #[test]
    fn test_feasible_cost_equals_weighted_travel() {
        let mut eval = CachedEvaluator::new(1);
        let p = PenaltyConfig::default().with_alpha(3.0).with_hard_penalties(1e6);
        assert_eq!(eval.evaluate(&metrics(7.0), &p).unwrap(), 21.0);
    }
}
