//! Evaluation budget.

use crate::error::{CaAlnsError, Result};
use serde::{Deserialize, Serialize};

/// Budget limits of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Maximum number of distinct (cache-miss) evaluations.
    pub max_evaluations: usize,

    /// Optional wall-clock limit in seconds, checked between trials.
    pub time_limit_s: Option<f64>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 100_000,
            time_limit_s: None,
        }
    }
}

impl BudgetConfig {
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_s = Some(seconds);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_evaluations == 0 {
            return Err("max_evaluations must be positive".into());
        }
        if let Some(t) = self.time_limit_s {
            if !(t > 0.0) {
                return Err(format!("time_limit_s must be positive, got {t}"));
            }
        }
        Ok(())
    }
}

/// Monotone evaluation counter bounded by a fixed maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationBudget {
    used: usize,
    max: usize,
}

impl EvaluationBudget {
    pub fn new(max: usize) -> Self {
        Self { used: 0, max }
    }

    /// Consumes one evaluation. Fails, leaving the counter untouched, when
    /// the maximum has already been reached.
    pub fn tick(&mut self) -> Result<()> {
        if self.used >= self.max {
            return Err(CaAlnsError::EvaluationBudgetExceeded {
                used: self.used + 1,
                max: self.max,
            });
        }
        self.used += 1;
        Ok(())
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn remaining(&self) -> usize {
        self.max - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }
}
