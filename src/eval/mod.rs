//! Fitness evaluation under a hard evaluation budget.
//!
//! # Key Types
//!
//! - [`PenaltyConfig`]: objective weights and the warm-up / final phase tag
//! - [`CachedEvaluator`]: memoized, budget-counting evaluator shared by every
//!   algorithm so that comparisons are budget-equalized
//! - [`BudgetConfig`]: evaluation and wall-clock limits
//!
//! [`measure_energy_wh`] and the improvement-per-kWh functions score runs by
//! their estimated energy use.

mod budget;
mod energy;
mod evaluator;
mod fitness;
mod penalty;

pub use budget::{BudgetConfig, EvaluationBudget};
pub use energy::{
    energy_wh, improvement_abs_per_kwh, improvement_per_kwh, measure_energy_wh,
    DEFAULT_AVG_POWER_W,
};
pub use evaluator::CachedEvaluator;
pub use fitness::fitness_value;
pub use penalty::{travel_upper_bound, PenaltyConfig, Phase};
