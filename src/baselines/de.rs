//! Differential evolution baseline (DE/rand/1/bin) over random keys.
//!
//! A vector holds `2n` keys in `[0, 1)`. The first `n` keys rank the targets
//! into a visiting order; key `n + t` picks the owner of target `t` as
//! `floor(key * m)`.
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution"
//! - Bean (1994), "Genetic Algorithms and Random Keys for Sequencing and
//!   Optimization"

use super::{evaluate_encoding, BaselineResult, Scored};
use crate::error::{CaAlnsError, Result};
use crate::eval::CachedEvaluator;
use crate::problem::RoutingProblem;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

/// Largest key value; keeps `floor(key * m) < m`.
const KEY_MAX: f64 = 1.0 - 1e-9;

/// Configuration for the DE baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeConfig {
    /// Number of vectors; at least 4 for rand/1 mutation.
    pub population_size: usize,

    /// Differential weight `F`.
    pub differential_weight: f64,

    /// Binomial crossover probability `CR`.
    pub crossover_rate: f64,

    /// Cap on trial vectors; `None` means 50 per budgeted evaluation.
    pub max_iterations: Option<usize>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            differential_weight: 0.5,
            crossover_rate: 0.8,
            max_iterations: None,
            seed: None,
        }
    }
}

impl DeConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_weights(mut self, f: f64, cr: f64) -> Self {
        self.differential_weight = f;
        self.crossover_rate = cr;
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
        if self.population_size < 4 {
            return Err(format!(
                "population_size must be at least 4, got {}",
                self.population_size
            ));
        }
        if !(self.differential_weight > 0.0 && self.differential_weight <= 2.0) {
            return Err(format!(
                "differential_weight must be in (0, 2], got {}",
                self.differential_weight
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(format!(
                "crossover_rate must be in [0, 1], got {}",
                self.crossover_rate
            ));
        }
        Ok(())
    }
}

/// Splits a key vector into `(order, owner)`.
fn decode_keys(keys: &[f64], n: usize, m: usize) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        keys[a]
            .partial_cmp(&keys[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    let m = m.max(1);
    let owner = (0..n)
        .map(|t| ((keys[n + t] * m as f64) as usize).min(m - 1))
        .collect();
    (order, owner)
}

/// Keys reproducing the round-robin plan.
fn round_robin_keys(n: usize, m: usize) -> Vec<f64> {
    let m = m.max(1);
    let mut keys: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    keys.extend((0..n).map(|i| ((i % m) as f64 + 0.5) / m as f64));
    keys
}

fn score_keys(
    problem: &RoutingProblem,
    evaluator: &mut CachedEvaluator,
    keys: &[f64],
) -> Result<Scored> {
    let instance = problem.instance();
    let (order, owner) = decode_keys(keys, instance.targets.len(), instance.uavs.len());
    evaluate_encoding(problem, evaluator, &order, &owner)
}

/// Executes the DE baseline.
pub struct DeRunner;

impl DeRunner {
    /// Runs DE until the evaluation budget, iteration cap or wall-clock
    /// limit is reached. A trial vector replaces its target vector when it
    /// is no worse.
    pub fn run(problem: &RoutingProblem, config: &DeConfig) -> Result<BaselineResult> {
        config
            .validate()
            .map_err(|e| CaAlnsError::InvalidConfig(format!("de: {e}")))?;

        let start = Instant::now();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let instance = problem.instance();
        let n = instance.targets.len();
        let dim = 2 * n;
        let mut evaluator = CachedEvaluator::new(problem.budget().max_evaluations);
        let time_limit = problem.budget().time_limit_s;
        let iteration_limit = config
            .max_iterations
            .unwrap_or_else(|| evaluator.max().saturating_mul(50));

        let first = round_robin_keys(n, instance.uavs.len());
        let mut best = score_keys(problem, &mut evaluator, &first)?;
        let mut population = vec![first];
        let mut costs = vec![best.cost];
        while population.len() < config.population_size && !evaluator.is_exhausted() {
            let keys: Vec<f64> = (0..dim).map(|_| rng.random_range(0.0..1.0)).collect();
            let scored = score_keys(problem, &mut evaluator, &keys)?;
            costs.push(scored.cost);
            population.push(keys);
            if scored.cost < best.cost {
                best = scored;
            }
        }

        let mut iterations = 0usize;
        // rand/1 needs three donors besides the target vector.
        let mut stop = population.len() < 4 || dim == 0;
        while !stop {
            for i in 0..population.len() {
                if evaluator.is_exhausted() || iterations >= iteration_limit {
                    stop = true;
                    break;
                }
                if let Some(limit) = time_limit {
                    if start.elapsed().as_secs_f64() >= limit {
                        stop = true;
                        break;
                    }
                }

                let donors: Vec<usize> = sample(&mut rng, population.len() - 1, 3)
                    .into_iter()
                    .map(|d| if d >= i { d + 1 } else { d })
                    .collect();
                let (a, b, c) = (
                    &population[donors[0]],
                    &population[donors[1]],
                    &population[donors[2]],
                );
                let j_rand = rng.random_range(0..dim);
                let trial: Vec<f64> = (0..dim)
                    .map(|j| {
                        if j == j_rand || rng.random_bool(config.crossover_rate) {
                            (a[j] + config.differential_weight * (b[j] - c[j])).clamp(0.0, KEY_MAX)
                        } else {
                            population[i][j]
                        }
                    })
                    .collect();

                let scored = score_keys(problem, &mut evaluator, &trial)?;
                iterations += 1;
                if scored.cost <= costs[i] {
                    costs[i] = scored.cost;
                    population[i] = trial;
                    if scored.cost < best.cost {
                        best = scored;
                    }
                }
            }
        }

        let wallclock_s = start.elapsed().as_secs_f64();
        tracing::info!(
            seed,
            iterations,
            fitness = best.cost,
            evaluations = evaluator.used(),
            "DE baseline finished"
        );

        Ok(BaselineResult {
            algorithm: "de",
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
