//! CA-ALNS configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the CA-ALNS search loop.
///
/// # Scoring
///
/// At each trial the selected destroy/repair pair receives a score:
/// - `score_new_best` (w1): found a new global best solution
/// - `score_improved` (w2): improved the current solution
/// - `score_accepted` (w3): accepted a worse solution (via SA criterion)
///
/// Scores accumulate over a *block* of `block_len` trials, then operator
/// weights are updated via exponential smoothing with `reaction_factor`.
///
/// # Temperature
///
/// `T0 = max(eps, t0_scale * max(1, mean_insert_cost))` where the mean
/// insert cost is measured on the initial solution. The temperature decays
/// geometrically by `cooling_rate` after every trial.
///
/// # Penalty phases
///
/// The first `warm_blocks` blocks run with softened hard penalties derived
/// from `p_warm`; see [`PenaltyConfig::warmup`](crate::eval::PenaltyConfig::warmup).
///
/// # Examples
///
/// ```
/// use ca_alns::alns::AlnsConfig;
///
/// let config = AlnsConfig::default()
///     .with_block_len(25)
///     .with_warm_blocks(4)
///     .with_scores(5.0, 2.0, 0.5)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlnsConfig {
    /// Scale of the initial temperature relative to the mean insert cost.
    pub t0_scale: f64,

    /// Geometric cooling factor, in (0, 1).
    pub cooling_rate: f64,

    /// Trials per adaptation block.
    pub block_len: usize,

    /// Score for finding a new global best (w1).
    pub score_new_best: f64,

    /// Score for improving the current solution (w2).
    pub score_improved: f64,

    /// Score for accepting a worse solution (w3).
    pub score_accepted: f64,

    /// Reaction factor for weight updates, in (0, 1].
    pub reaction_factor: f64,

    /// Minimum operator weight.
    pub min_weight: f64,

    /// Minimum fraction of targets removed by a destroy operator.
    pub min_destroy_degree: f64,

    /// Maximum fraction of targets removed by a destroy operator.
    pub max_destroy_degree: f64,

    /// Regret depth of the regret insertion operator (2 or 3).
    pub k_regret: usize,

    /// Enables rally-point repair.
    pub use_rally_points: bool,

    /// Probability of a speculative rally insertion after each repair.
    pub rally_probability: f64,

    /// Dwell inserted at rally points; at least 5 time units are enforced.
    pub rally_wait: f64,

    /// Number of blocks spent in the warm-up phase.
    pub warm_blocks: usize,

    /// Target acceptance probability of an infeasible move during warm-up.
    pub p_warm: f64,

    /// Hard cap on trials; `None` means 50 trials per budgeted evaluation.
    pub max_trials: Option<usize>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AlnsConfig {
    fn default() -> Self {
        Self {
            t0_scale: 0.05,
            cooling_rate: 0.995,
            block_len: 50,
            score_new_best: 5.0,
            score_improved: 2.0,
            score_accepted: 0.5,
            reaction_factor: 0.1,
            min_weight: 0.01,
            min_destroy_degree: 0.1,
            max_destroy_degree: 0.4,
            k_regret: 2,
            use_rally_points: true,
            rally_probability: 0.1,
            rally_wait: 5.0,
            warm_blocks: 3,
            p_warm: 1e-2,
            max_trials: None,
            seed: None,
        }
    }
}

impl AlnsConfig {
    pub fn with_t0_scale(mut self, scale: f64) -> Self {
        self.t0_scale = scale;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_block_len(mut self, n: usize) -> Self {
        self.block_len = n.max(1);
        self
    }

    pub fn with_scores(mut self, new_best: f64, improved: f64, accepted: f64) -> Self {
        self.score_new_best = new_best;
        self.score_improved = improved;
        self.score_accepted = accepted;
        self
    }

    pub fn with_reaction_factor(mut self, rho: f64) -> Self {
        self.reaction_factor = rho;
        self
    }

    pub fn with_destroy_degree(mut self, min: f64, max: f64) -> Self {
        self.min_destroy_degree = min.clamp(0.0, 1.0);
        self.max_destroy_degree = max.clamp(self.min_destroy_degree, 1.0);
        self
    }

    pub fn with_k_regret(mut self, k: usize) -> Self {
        self.k_regret = k;
        self
    }

    pub fn with_rally_points(mut self, enabled: bool) -> Self {
        self.use_rally_points = enabled;
        self
    }

    pub fn with_rally_probability(mut self, p: f64) -> Self {
        self.rally_probability = p;
        self
    }

    pub fn with_warm_blocks(mut self, n: usize) -> Self {
        self.warm_blocks = n;
        self
    }

    pub fn with_p_warm(mut self, p: f64) -> Self {
        self.p_warm = p;
        self
    }

    pub fn with_max_trials(mut self, n: usize) -> Self {
        self.max_trials = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Trial cap for a run with `max_evaluations` budgeted evaluations.
    pub fn trial_limit(&self, max_evaluations: usize) -> usize {
        self.max_trials
            .unwrap_or_else(|| max_evaluations.saturating_mul(50))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.t0_scale > 0.0) {
            return Err(format!("t0_scale must be positive, got {}", self.t0_scale));
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if self.block_len == 0 {
            return Err("block_len must be positive".into());
        }
        if self.reaction_factor <= 0.0 || self.reaction_factor > 1.0 {
            return Err(format!(
                "reaction_factor must be in (0, 1], got {}",
                self.reaction_factor
            ));
        }
        if self.min_destroy_degree > self.max_destroy_degree {
            return Err("min_destroy_degree must be <= max_destroy_degree".into());
        }
        if !(2..=3).contains(&self.k_regret) {
            return Err(format!("k_regret must be 2 or 3, got {}", self.k_regret));
        }
        if !(0.0..=1.0).contains(&self.rally_probability) {
            return Err(format!(
                "rally_probability must be in [0, 1], got {}",
                self.rally_probability
            ));
        }
        if self.p_warm <= 0.0 || self.p_warm >= 1.0 {
            return Err(format!("p_warm must be in (0, 1), got {}", self.p_warm));
        }
        if self.max_trials == Some(0) {
            return Err("max_trials must be positive when set".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AlnsConfig::default();
        assert_eq!(config.block_len, 50);
        assert_eq!(config.warm_blocks, 3);
        assert!((config.cooling_rate - 0.995).abs() < 1e-12);
        assert!((config.score_new_best - 5.0).abs() < 1e-12);
        assert!(config.use_rally_points);
    }

    #[test]
    fn test_validate_ok() {
        assert!(AlnsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_cooling_rate() {
        assert!(AlnsConfig::default().with_cooling_rate(1.0).validate().is_err());
        assert!(AlnsConfig::default().with_cooling_rate(0.0).validate().is_err());
    }

    #[test]
    fn test_validate_bad_regret_and_p_warm() {
        assert!(AlnsConfig::default().with_k_regret(4).validate().is_err());
        assert!(AlnsConfig::default().with_p_warm(1.0).validate().is_err());
        assert!(AlnsConfig::default()
            .with_rally_probability(1.5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_trial_limit() {
        assert_eq!(AlnsConfig::default().trial_limit(200), 10_000);
        assert_eq!(AlnsConfig::default().with_max_trials(7).trial_limit(200), 7);
    }

    #[test]
    fn test_builder_chain() {
        let config = AlnsConfig::default()
            .with_block_len(0)
            .with_destroy_degree(0.3, 0.2)
            .with_k_regret(3)
            .with_seed(7);
        assert_eq!(config.block_len, 1);
        assert!((config.max_destroy_degree - 0.3).abs() < 1e-12);
        assert_eq!(config.k_regret, 3);
        assert_eq!(config.seed, Some(7));
    }
}
