//! Penalty weights and the two-phase schedule.

use crate::model::Instance;
use serde::{Deserialize, Serialize};

/// Penalty regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Softened hard penalties to ease early exploration.
    Warmup,
    /// Full penalties.
    Final,
}

/// Weights of the fitness function.
///
/// # Examples
///
/// ```
/// use ca_alns::eval::PenaltyConfig;
///
/// let penalties = PenaltyConfig::default()
///     .with_hard_penalties(1e4)
///     .with_balance_weight(0.5)
///     .with_makespan(200.0, 50.0);
/// assert!(penalties.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Travel distance weight.
    pub alpha: f64,
    /// Added when the fleet loses connectivity.
    pub lambda_disc: f64,
    /// Added when a payload capacity is exceeded.
    pub lambda_cap: f64,
    /// Added when a battery capacity is exceeded.
    pub lambda_bat: f64,
    /// Weight of `workload_max - workload_min`.
    pub lambda_bal: f64,
    /// Weight of the accumulated rally dwell.
    pub lambda_wait: f64,
    /// Weight of the rally-point count.
    pub lambda_rp: f64,
    /// Added when the makespan exceeds `makespan_threshold`.
    pub lambda_makespan: f64,
    pub makespan_threshold: Option<f64>,
    pub phase: Phase,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            lambda_disc: 0.0,
            lambda_cap: 0.0,
            lambda_bat: 0.0,
            lambda_bal: 0.0,
            lambda_wait: 0.0,
            lambda_rp: 0.0,
            lambda_makespan: 0.0,
            makespan_threshold: None,
            phase: Phase::Final,
        }
    }
}

impl PenaltyConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the disconnection, capacity and battery penalties at once.
    pub fn with_hard_penalties(mut self, penalty: f64) -> Self {
        self.lambda_disc = penalty;
        self.lambda_cap = penalty;
        self.lambda_bat = penalty;
        self
    }

    pub fn with_balance_weight(mut self, weight: f64) -> Self {
        self.lambda_bal = weight;
        self
    }

    pub fn with_rally_weights(mut self, wait: f64, count: f64) -> Self {
        self.lambda_wait = wait;
        self.lambda_rp = count;
        self
    }

    pub fn with_makespan(mut self, threshold: f64, penalty: f64) -> Self {
        self.makespan_threshold = Some(threshold);
        self.lambda_makespan = penalty;
        self
    }

    /// Final-phase weights with hard penalties calibrated to `instance`.
    ///
    /// The hard penalties become `max(1.01 * C_aug, 1000)` where `C_aug` is
    /// the travel upper bound from [`travel_upper_bound`], so one violation
    /// outweighs any travel saving.
    pub fn calibrated(instance: &Instance, alpha: f64) -> Self {
        let bound = travel_upper_bound(instance, alpha);
        Self::default()
            .with_alpha(alpha)
            .with_hard_penalties((1.01 * bound).max(1e3))
    }

    /// Warm-up weights derived from these final weights.
    ///
    /// Hard penalties become `max(0.5 * final, T0 * ln(1 / p_warm))`: an
    /// infeasible move still costs more than the temperature scale admits
    /// with probability above `p_warm`.
    pub fn warmup(&self, t0: f64, p_warm: f64) -> Self {
        let floor = t0 * (1.0 / p_warm.max(1e-9)).ln();
        Self {
            lambda_disc: (0.5 * self.lambda_disc).max(floor),
            lambda_cap: (0.5 * self.lambda_cap).max(floor),
            lambda_bat: (0.5 * self.lambda_bat).max(floor),
            phase: Phase::Warmup,
            ..self.clone()
        }
    }

    /// The same weights tagged as final.
    pub fn into_final(self) -> Self {
        Self {
            phase: Phase::Final,
            ..self
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("alpha", self.alpha),
            ("lambda_disc", self.lambda_disc),
            ("lambda_cap", self.lambda_cap),
            ("lambda_bat", self.lambda_bat),
            ("lambda_bal", self.lambda_bal),
            ("lambda_wait", self.lambda_wait),
            ("lambda_rp", self.lambda_rp),
            ("lambda_makespan", self.lambda_makespan),
        ];
        for (name, value) in weights {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        if let Some(h) = self.makespan_threshold {
            if h < 0.0 {
                return Err(format!("makespan_threshold must be non-negative, got {h}"));
            }
        }
        Ok(())
    }
}

/// Rough upper bound on the weighted travel cost of any sensible plan.
///
/// `alpha * min(m * 2 W*, 2 W* + 2 m R_max)` with `W*` the sum of depot to
/// target distances, `R_max` the largest of them and `m` the fleet size.
pub fn travel_upper_bound(instance: &Instance, alpha: f64) -> f64 {
    let depot = instance.depot.position;
    let radii: Vec<f64> = instance
        .targets
        .iter()
        .map(|t| depot.distance(&t.position))
        .collect();
    let star: f64 = radii.iter().sum();
    let r_max = radii.iter().copied().fold(0.0, f64::max);
    let m = instance.uavs.len() as f64;
    alpha * (m * 2.0 * star).min(2.0 * star + 2.0 * m * r_max)
}
