//! CA-ALNS execution loop.

use super::config::AlnsConfig;
use super::operators::{mean_insertion_cost, DestroyKind, RepairKind};
use super::rally::{RallyInsertion, RallyRepair};
use super::types::{DestroyOperator, RepairOperator};
use crate::error::{CaAlnsError, Result};
use crate::eval::{CachedEvaluator, Phase};
use crate::model::{Solution, SolutionMetrics};
use crate::problem::RoutingProblem;
use crate::result::RunResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lower bound on the initial temperature.
pub const MIN_INITIAL_TEMPERATURE: f64 = 1e-6;

/// Result of a CA-ALNS run.
#[derive(Debug, Clone)]
pub struct AlnsResult {
    /// The best plan found, after the final rally repair if one was applied.
    pub best: Solution,

    /// Metrics of `best`.
    pub best_metrics: SolutionMetrics,

    /// Final-phase cost of `best`. `None` when the final rally repair
    /// modified the plan after its last evaluation, or when the budget ran
    /// out before it could be scored under the final penalties.
    pub fitness: Option<f64>,

    /// Last evaluated cost of the best plan, in the phase it was scored in.
    pub best_cost: f64,

    /// Cost of the round-robin starting plan (warm-up phase unless there
    /// are no warm-up blocks).
    pub initial_cost: f64,

    pub initial_temperature: f64,
    pub final_temperature: f64,

    /// Trials executed.
    pub trials: usize,

    /// Completed adaptation blocks.
    pub blocks: usize,

    /// Number of new global bests found.
    pub improvements: usize,

    /// Phase active when the run stopped.
    pub final_phase: Phase,

    /// Trial count at which the final penalties took over.
    pub phase_switch_trial: Option<usize>,

    /// Index of the first block run under final penalties.
    pub phase_switch_block: Option<usize>,

    /// Phase used during each completed block.
    pub block_phases: Vec<Phase>,

    pub evaluations_used: usize,
    pub cache_hits: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Whether the wall-clock limit stopped the run.
    pub timed_out: bool,

    /// Whether the evaluation budget was spent.
    pub budget_exhausted: bool,

    /// Final destroy operator weights.
    pub destroy_weights: Vec<f64>,

    /// Final repair operator weights.
    pub repair_weights: Vec<f64>,

    /// Best cost at the start and after every block.
    pub cost_history: Vec<f64>,

    /// Rally insertion applied to the reported plan after the search.
    pub final_repair: Option<RallyInsertion>,

    /// Seed that drove the run.
    pub seed: u64,

    pub wallclock_s: f64,
}

impl AlnsResult {
    /// Flat per-run record.
    pub fn to_run_result(&self) -> RunResult {
        RunResult::from_metrics(&self.best_metrics)
            .with_algorithm("ca_alns")
            .with_seed(self.seed)
            .with_fitness(self.fitness)
            .with_evaluations(self.evaluations_used)
            .with_wallclock(self.wallclock_s)
    }
}

/// Tracks per-operator statistics for adaptive weight updates.
#[derive(Debug, Clone)]
struct OperatorStats {
    weight: f64,
    block_score: f64,
    block_uses: usize,
}

impl OperatorStats {
    fn new() -> Self {
        Self {
            weight: 1.0,
            block_score: 0.0,
            block_uses: 0,
        }
    }

    fn record(&mut self, score: f64) {
        self.block_score += score;
        self.block_uses += 1;
    }

    /// Update weight using exponential smoothing at the end of a block.
    ///
    /// w_new = w * (1 - rho) + rho * (pi_j / theta_j)
    ///
    /// where pi_j = accumulated score, theta_j = times used in the block.
    /// Unused operators keep their weight.
    ///
    /// Reference: Ropke & Pisinger (2006), Equation (1)
    fn update_weight(&mut self, reaction_factor: f64, min_weight: f64) {
        if self.block_uses > 0 {
            let avg_score = self.block_score / self.block_uses as f64;
            self.weight = self.weight * (1.0 - reaction_factor) + avg_score * reaction_factor;
            self.weight = self.weight.max(min_weight);
        }
        self.block_score = 0.0;
        self.block_uses = 0;
    }
}

/// Select an operator index using roulette wheel selection on weights.
fn roulette_select<R: Rng>(weights: &[OperatorStats], rng: &mut R) -> usize {
    let total: f64 = weights.iter().map(|s| s.weight).sum();
    if total <= 0.0 || weights.is_empty() {
        return 0;
    }

    let mut roll = rng.random_range(0.0..total);
    for (i, stat) in weights.iter().enumerate() {
        roll -= stat.weight;
        if roll <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}

fn measure(problem: &RoutingProblem, solution: &Solution) -> SolutionMetrics {
    let mut metrics = problem.measure(solution);
    metrics.ensure_feasibility_flags();
    metrics
}

/// Executes the CA-ALNS algorithm.
pub struct AlnsRunner;

impl AlnsRunner {
    /// Runs CA-ALNS with the built-in operator portfolio.
    pub fn run_default(problem: &RoutingProblem, config: &AlnsConfig) -> Result<AlnsResult> {
        Self::run(
            problem,
            &DestroyKind::defaults(),
            &RepairKind::defaults(config),
            config,
        )
    }

    /// Runs CA-ALNS optimization.
    ///
    /// # Arguments
    /// * `problem` - Instance, connectivity screen, penalties and budget
    /// * `destroy_ops` - Slice of destroy operators
    /// * `repair_ops` - Slice of repair operators
    /// * `config` - Algorithm configuration
    pub fn run<D, R>(
        problem: &RoutingProblem,
        destroy_ops: &[D],
        repair_ops: &[R],
        config: &AlnsConfig,
    ) -> Result<AlnsResult>
    where
        D: DestroyOperator,
        R: RepairOperator,
    {
        Self::run_with_cancel(problem, destroy_ops, repair_ops, config, None)
    }

    /// Runs CA-ALNS with an optional cancellation token.
    ///
    /// The run stops at the first of: evaluation budget spent, trial cap,
    /// wall-clock limit, cancellation. Each condition is checked between
    /// trials.
    pub fn run_with_cancel<D, RP>(
        problem: &RoutingProblem,
        destroy_ops: &[D],
        repair_ops: &[RP],
        config: &AlnsConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AlnsResult>
    where
        D: DestroyOperator,
        RP: RepairOperator,
    {
        config
            .validate()
            .map_err(|e| CaAlnsError::InvalidConfig(format!("operators: {e}")))?;
        if destroy_ops.is_empty() || repair_ops.is_empty() {
            return Err(CaAlnsError::InvalidConfig(
                "at least one destroy and one repair operator required".into(),
            ));
        }

        let start = Instant::now();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let instance = problem.instance();
        let screen = problem.screen();
        let rally = RallyRepair::new(config.rally_wait);
        let final_penalties = problem.penalties().clone();
        let mut evaluator = CachedEvaluator::new(problem.budget().max_evaluations);
        let time_limit = problem.budget().time_limit_s;
        let trial_limit = config.trial_limit(evaluator.max());

        // Initialize
        let mut current = problem.initial_solution();
        let initial_temperature = (config.t0_scale * mean_insertion_cost(&current).max(1.0))
            .max(MIN_INITIAL_TEMPERATURE);

        let (mut phase, mut penalties) = if config.warm_blocks == 0 {
            (Phase::Final, final_penalties.clone())
        } else {
            (
                Phase::Warmup,
                final_penalties.warmup(initial_temperature, config.p_warm),
            )
        };

        tracing::info!(
            seed,
            targets = instance.targets.len(),
            uavs = instance.uavs.len(),
            budget = evaluator.max(),
            t0 = initial_temperature,
            delta_tau = screen.delta_tau(),
            "starting CA-ALNS run"
        );

        let mut current_metrics = measure(problem, &current);
        let mut current_cost = evaluator.evaluate(&current_metrics, &penalties)?;
        let initial_cost = current_cost;
        let mut best = current.clone();
        let mut best_metrics = current_metrics.clone();
        let mut best_cost = current_cost;
        let mut best_cost_phase = phase;

        let mut destroy_stats: Vec<OperatorStats> =
            destroy_ops.iter().map(|_| OperatorStats::new()).collect();
        let mut repair_stats: Vec<OperatorStats> =
            repair_ops.iter().map(|_| OperatorStats::new()).collect();

        let mut temperature = initial_temperature;
        let mut trials = 0usize;
        let mut blocks = 0usize;
        let mut improvements = 0usize;
        let mut cancelled = false;
        let mut timed_out = false;
        let mut phase_switch_trial = if phase == Phase::Final { Some(0) } else { None };
        let mut phase_switch_block = if phase == Phase::Final { Some(0) } else { None };
        let mut block_phases = Vec::new();
        let mut cost_history = vec![best_cost];

        while trials < trial_limit && !evaluator.is_exhausted() {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if let Some(limit) = time_limit {
                if start.elapsed().as_secs_f64() >= limit {
                    timed_out = true;
                    break;
                }
            }

            // Select operators via roulette wheel
            let d_idx = roulette_select(&destroy_stats, &mut rng);
            let r_idx = roulette_select(&repair_stats, &mut rng);

            let degree = if config.max_destroy_degree > config.min_destroy_degree {
                rng.random_range(config.min_destroy_degree..config.max_destroy_degree)
            } else {
                config.min_destroy_degree
            };

            // Destroy then repair
            let partial = destroy_ops[d_idx].destroy(instance, &current, degree, &mut rng);
            let mut candidate = repair_ops[r_idx].repair(instance, partial, &mut rng);
            let mut metrics = measure(problem, &candidate);

            // One rally attempt per trial: forced when disconnected,
            // speculative otherwise.
            if config.use_rally_points
                && (!metrics.is_connected() || rng.random_bool(config.rally_probability))
                && rally.repair(&mut candidate, instance, screen).is_some()
            {
                metrics = measure(problem, &candidate);
            }

            let candidate_cost = evaluator.evaluate(&metrics, &penalties)?;

            // Determine score and acceptance
            let (accepted, score) = if candidate_cost < best_cost {
                // New global best (w1)
                (true, config.score_new_best)
            } else if candidate_cost < current_cost {
                // Better than current (w2)
                (true, config.score_improved)
            } else {
                // SA acceptance criterion
                let delta = candidate_cost - current_cost;
                let accept_prob = if temperature > 0.0 {
                    (-delta / temperature).exp()
                } else {
                    0.0
                };
                if rng.random_range(0.0..1.0) < accept_prob {
                    (true, config.score_accepted)
                } else {
                    (false, 0.0)
                }
            };

            if accepted {
                if candidate_cost < best_cost {
                    best = candidate.clone();
                    best_metrics = metrics.clone();
                    best_cost = candidate_cost;
                    best_cost_phase = phase;
                    improvements += 1;
                }
                current = candidate;
                current_metrics = metrics;
                current_cost = candidate_cost;
            }

            // Record operator usage
            destroy_stats[d_idx].record(score);
            repair_stats[r_idx].record(score);

            // Cool down
            temperature *= config.cooling_rate;
            trials += 1;

            if trials % config.block_len != 0 {
                continue;
            }

            // End-of-block weight update
            for stat in &mut destroy_stats {
                stat.update_weight(config.reaction_factor, config.min_weight);
            }
            for stat in &mut repair_stats {
                stat.update_weight(config.reaction_factor, config.min_weight);
            }
            block_phases.push(phase);
            blocks += 1;
            cost_history.push(best_cost);
            tracing::debug!(
                block = blocks,
                trials,
                temperature,
                best_cost,
                current_cost,
                evaluations = evaluator.used(),
                "block finished"
            );

            if phase == Phase::Warmup
                && (blocks >= config.warm_blocks || best_metrics.is_feasible())
            {
                phase = Phase::Final;
                penalties = final_penalties.clone();
                phase_switch_trial = Some(trials);
                phase_switch_block = Some(blocks);
                tracing::info!(
                    block = blocks,
                    trials,
                    best_feasible = best_metrics.is_feasible(),
                    "switching to final penalties"
                );

                // Rescore both anchors so later comparisons share one scale.
                if evaluator.remaining() < 2 {
                    break;
                }
                best_cost = evaluator.evaluate(&best_metrics, &penalties)?;
                best_cost_phase = Phase::Final;
                current_cost = evaluator.evaluate(&current_metrics, &penalties)?;
                if current_cost < best_cost {
                    best = current.clone();
                    best_metrics = current_metrics.clone();
                    best_cost = current_cost;
                }
            }
        }

        let mut fitness = if best_cost_phase == Phase::Final {
            Some(best_cost)
        } else if !evaluator.is_exhausted() {
            Some(evaluator.evaluate(&best_metrics, &final_penalties)?)
        } else {
            None
        };

        let mut final_repair = None;
        if config.use_rally_points && !best_metrics.is_connected() {
            tracing::warn!(
                connected_pct = best_metrics.snapshots_connected_pct.unwrap_or(0.0),
                "best plan is disconnected, applying final rally repair"
            );
            let mut repaired = best.clone();
            if let Some(info) = rally.repair(&mut repaired, instance, screen) {
                best = repaired;
                best_metrics = measure(problem, &best);
                fitness = None;
                final_repair = Some(info);
            }
        }

        let wallclock_s = start.elapsed().as_secs_f64();
        tracing::info!(
            trials,
            blocks,
            best_cost,
            fitness,
            evaluations = evaluator.used(),
            cache_hits = evaluator.cache_hits(),
            connected = best_metrics.is_connected(),
            wallclock_s,
            "CA-ALNS run finished"
        );

        Ok(AlnsResult {
            best,
            best_metrics,
            fitness,
            best_cost,
            initial_cost,
            initial_temperature,
            final_temperature: temperature,
            trials,
            blocks,
            improvements,
            final_phase: phase,
            phase_switch_trial,
            phase_switch_block,
            block_phases,
            evaluations_used: evaluator.used(),
            cache_hits: evaluator.cache_hits(),
            cancelled,
            timed_out,
            budget_exhausted: evaluator.is_exhausted(),
            destroy_weights: destroy_stats.iter().map(|s| s.weight).collect(),
            repair_weights: repair_stats.iter().map(|s| s.weight).collect(),
            cost_history,
            final_repair,
            seed,
            wallclock_s,
        })
    }
}

/// Runs one independent CA-ALNS search per seed, in parallel.
///
/// Each run owns its RNG and evaluator; results come back in seed order.
#[cfg(feature = "parallel")]
pub fn run_seeds(
    problem: &RoutingProblem,
    config: &AlnsConfig,
    seeds: &[u64],
) -> Vec<Result<AlnsResult>> {
    use rayon::prelude::*;

    seeds
        .par_iter()
        .map(|&seed| AlnsRunner::run_default(problem, &config.clone().with_seed(seed)))
        .collect()
}
