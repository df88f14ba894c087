//! Experiment-level configuration bundle.

use crate::alns::AlnsConfig;
use crate::connectivity::ConnectivityConfig;
use crate::eval::{BudgetConfig, PenaltyConfig};
use serde::{Deserialize, Serialize};

/// Everything needed to run one experiment, apart from the instance.
///
/// Deserializes from JSON with every section optional:
///
/// ```
/// use ca_alns::ExperimentConfig;
///
/// let config: ExperimentConfig = serde_json::from_str(
///     r#"{ "budget": { "max_evaluations": 500, "time_limit_s": null } }"#,
/// ).unwrap();
/// assert_eq!(config.budget.max_evaluations, 500);
/// assert_eq!(config.operators.block_len, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub connectivity: ConnectivityConfig,
    pub operators: AlnsConfig,
    pub budget: BudgetConfig,
    pub penalties: PenaltyConfig,
}

impl ExperimentConfig {
    pub fn with_connectivity(mut self, connectivity: ConnectivityConfig) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_operators(mut self, operators: AlnsConfig) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_penalties(mut self, penalties: PenaltyConfig) -> Self {
        self.penalties = penalties;
        self
    }

    /// Validates every section, prefixing errors with the section name.
    pub fn validate(&self) -> Result<(), String> {
        self.connectivity
            .validate()
            .map_err(|e| format!("connectivity: {e}"))?;
        self.operators
            .validate()
            .map_err(|e| format!("operators: {e}"))?;
        self.budget.validate().map_err(|e| format!("budget: {e}"))?;
        self.penalties
            .validate()
            .map_err(|e| format!("penalties: {e}"))?;
        Ok(())
    }
}
