//! Steady-state genetic algorithm baseline.
//!
//! A chromosome is a visiting order over target indices plus the owning
//! vehicle of each target. Each iteration breeds one child from two
//! tournament winners and overwrites the worst member of the population.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains" (OX)
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"

use super::{evaluate_encoding, random_encoding, round_robin_encoding, BaselineResult};
use crate::error::{CaAlnsError, Result};
use crate::eval::CachedEvaluator;
use crate::problem::RoutingProblem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Configuration for the GA baseline.
///
/// ```
/// use ca_alns::baselines::GaConfig;
///
/// let config = GaConfig::default().with_population_size(20).with_seed(1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Tournament size for parent selection.
    pub tournament_size: usize,

    /// Probability of applying order crossover to the visiting order.
    pub crossover_rate: f64,

    /// Probability of each mutation (swap, reassign) on an offspring.
    pub mutation_rate: f64,

    /// Cap on offspring; `None` means 50 per budgeted evaluation.
    pub max_iterations: Option<usize>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            tournament_size: 2,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            max_iterations: None,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.population_size < 2 {
            return Err(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            ));
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be positive".into());
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{name} must be in [0, 1], got {rate}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Member {
    order: Vec<usize>,
    owner: Vec<usize>,
    cost: f64,
}

/// Tournament selection: pick k random members, return the cheapest.
fn tournament<R: Rng>(population: &[Member], k: usize, rng: &mut R) -> usize {
    let n = population.len();
    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let idx = rng.random_range(0..n);
        if population[idx].cost < population[best_idx].cost {
            best_idx = idx;
        }
    }
    best_idx
}

/// Order Crossover (OX): copy a random segment of `template`, fill the
/// remaining slots with `donor`'s values in their order, wrapping after the
/// segment end.
///
/// Both parents must be permutations of `0..n` with `n >= 2`.
fn order_crossover<R: Rng>(template: &[usize], donor: &[usize], rng: &mut R) -> Vec<usize> {
    let n = template.len();
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    let (start, end) = if a <= b { (a, b) } else { (b, a) };

    let mut child = vec![usize::MAX; n];
    let mut taken = vec![false; n];
    for i in start..=end {
        child[i] = template[i];
        taken[template[i]] = true;
    }

    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let val = donor[(end + 1 + offset) % n];
        if !taken[val] {
            child[pos] = val;
            pos = (pos + 1) % n;
        }
    }
    child
}

/// Executes the GA baseline.
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA until the evaluation budget, iteration cap or wall-clock
    /// limit is reached.
    ///
    /// The round-robin plan seeds the population, so the result is never
    /// worse than it.
    pub fn run(problem: &RoutingProblem, config: &GaConfig) -> Result<BaselineResult> {
        config
            .validate()
            .map_err(|e| CaAlnsError::InvalidConfig(format!("ga: {e}")))?;

        let start = Instant::now();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let instance = problem.instance();
        let n = instance.targets.len();
        let m = instance.uavs.len();
        let mut evaluator = CachedEvaluator::new(problem.budget().max_evaluations);
        let time_limit = problem.budget().time_limit_s;
        let iteration_limit = config
            .max_iterations
            .unwrap_or_else(|| evaluator.max().saturating_mul(50));

        let (order, owner) = round_robin_encoding(instance);
        let mut best = evaluate_encoding(problem, &mut evaluator, &order, &owner)?;
        let mut population = vec![Member {
            order,
            owner,
            cost: best.cost,
        }];
        while population.len() < config.population_size && !evaluator.is_exhausted() {
            let (order, owner) = random_encoding(n, m, &mut rng);
            let scored = evaluate_encoding(problem, &mut evaluator, &order, &owner)?;
            population.push(Member {
                order,
                owner,
                cost: scored.cost,
            });
            if scored.cost < best.cost {
                best = scored;
            }
        }

        let mut iterations = 0usize;
        while !evaluator.is_exhausted() && iterations < iteration_limit {
            if let Some(limit) = time_limit {
                if start.elapsed().as_secs_f64() >= limit {
                    break;
                }
            }

            let p1 = tournament(&population, config.tournament_size, &mut rng);
            let p2 = tournament(&population, config.tournament_size, &mut rng);

            let mut order = if n > 1 && rng.random_bool(config.crossover_rate) {
                order_crossover(&population[p1].order, &population[p2].order, &mut rng)
            } else {
                population[p1].order.clone()
            };
            // Uniform crossover on owners.
            let mut owner: Vec<usize> = (0..n)
                .map(|t| {
                    if rng.random_bool(0.5) {
                        population[p1].owner[t]
                    } else {
                        population[p2].owner[t]
                    }
                })
                .collect();

            if n > 1 && rng.random_bool(config.mutation_rate) {
                let i = rng.random_range(0..n);
                let j = rng.random_range(0..n);
                order.swap(i, j);
            }
            if n > 0 && m > 1 && rng.random_bool(config.mutation_rate) {
                let t = rng.random_range(0..n);
                owner[t] = rng.random_range(0..m);
            }

            let scored = evaluate_encoding(problem, &mut evaluator, &order, &owner)?;
            iterations += 1;

            let worst = population
                .iter()
                .enumerate()
                .fold(0, |w, (i, member)| {
                    if member.cost > population[w].cost {
                        i
                    } else {
                        w
                    }
                });
            population[worst] = Member {
                order,
                owner,
                cost: scored.cost,
            };
            if scored.cost < best.cost {
                best = scored;
            }
        }

        let wallclock_s = start.elapsed().as_secs_f64();
        tracing::info!(
            seed,
            iterations,
            fitness = best.cost,
            evaluations = evaluator.used(),
            "GA baseline finished"
        );

        Ok(BaselineResult {
            algorithm: "ga",
            best: best.solution,
            best_metrics: best.metrics,
            fitness: best.cost,
            iterations,
            evaluations_used: evaluator.used(),
            cache_hits: evaluator.cache_hits(),
            seed,
            wallclock_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use crate::eval::{fitness_value, BudgetConfig, PenaltyConfig};
    use crate::model::{Instance, Node, Uav};
    use proptest::prelude::*;

    fn problem(budget: usize) -> RoutingProblem {
        let targets = (0..8)
            .map(|i| {
                let a = i as f64 * 0.8;
                Node::new(i + 1, 70.0 * a.cos(), 70.0 * a.sin())
            })
            .collect();
        let instance = Instance::new(
            Node::new(0, 0.0, 0.0),
            targets,
            vec![Uav::new(0), Uav::new(1), Uav::new(2)],
        );
        let config = ExperimentConfig::default()
            .with_budget(BudgetConfig::default().with_max_evaluations(budget))
            .with_penalties(PenaltyConfig::calibrated(&instance, 1.0));
        RoutingProblem::new(instance, &config).unwrap()
    }

    #[test]
    fn test_ga_respects_budget() {
        let p = problem(120);
        let result = GaRunner::run(&p, &GaConfig::default().with_seed(4)).unwrap();
        assert!(result.evaluations_used <= 120);
        assert!(result.best.covers_targets_exactly_once(p.instance()));
        assert_eq!(result.to_run_result().algorithm.as_deref(), Some("ga"));
    }

    #[test]
    fn test_ga_budget_smaller_than_population() {
        let p = problem(3);
        let result = GaRunner::run(&p, &GaConfig::default().with_seed(4)).unwrap();
        assert!(result.evaluations_used <= 3);
    }

    #[test]
    fn test_ga_never_worse_than_round_robin() {
        let p = problem(200);
        let start = p.measure(&p.initial_solution());
        let start_cost = fitness_value(&start, p.penalties());
        let result = GaRunner::run(&p, &GaConfig::default().with_seed(8)).unwrap();
        assert!(result.fitness <= start_cost + 1e-9);
    }

    #[test]
    fn test_ga_deterministic_with_seed() {
        let p = problem(80);
        let config = GaConfig::default().with_population_size(10).with_seed(21);
        let a = GaRunner::run(&p, &config).unwrap();
        let b = GaRunner::run(&p, &config).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.evaluations_used, b.evaluations_used);
    }

    #[test]
    fn test_ga_rejects_tiny_population() {
        let p = problem(10);
        let err = GaRunner::run(&p, &GaConfig::default().with_population_size(1)).unwrap_err();
        assert!(matches!(err, CaAlnsError::InvalidConfig(_)));
    }

    proptest! {
        #[test]
        fn prop_order_crossover_is_permutation(n in 2usize..20, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p1: Vec<usize> = (0..n).collect();
            let p2: Vec<usize> = (0..n).rev().collect();
            let mut child = order_crossover(&p1, &p2, &mut rng);
            child.sort_unstable();
            prop_assert_eq!(child, p1);
        }
    }
}
