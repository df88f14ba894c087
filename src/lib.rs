//! Connectivity-aware adaptive large neighborhood search for multi-UAV
//! routing.
//!
//! Given a depot, a set of targets and a small fleet, the crate searches for
//! depot-to-depot routes that visit every target once while the fleet stays
//! a connected communication network during the whole mission.
//!
//! - **Model** ([`model`]): instances, routes, and derived metrics with a
//!   canonical SHA-256 fingerprint.
//! - **Connectivity** ([`connectivity`]): range or SNR link models, BFS
//!   reachability, graph features, and time-sampled snapshots at a cadence
//!   that cannot miss a disconnection.
//! - **Surrogate** ([`surrogate`]): a frozen logistic model that flags risky
//!   snapshots for repair.
//! - **Evaluation** ([`eval`]): penalized fitness, memoized under a hard
//!   evaluation budget shared by every algorithm.
//! - **CA-ALNS** ([`alns`]): destroy/repair search with adaptive operator
//!   weights, simulated annealing acceptance, a warm-up penalty phase, and
//!   rally-point repair.
//! - **Baselines** ([`baselines`]): GA and DE comparators on the same
//!   evaluator and budget.
//!
//! # Example
//!
//! ```
//! use ca_alns::alns::{AlnsConfig, AlnsRunner};
//! use ca_alns::eval::{BudgetConfig, PenaltyConfig};
//! use ca_alns::model::{Instance, Node, Uav};
//! use ca_alns::{ExperimentConfig, RoutingProblem};
//!
//! let instance = Instance::new(
//!     Node::new(0, 0.0, 0.0),
//!     vec![Node::new(1, 40.0, 0.0), Node::new(2, -40.0, 0.0)],
//!     vec![Uav::new(0), Uav::new(1)],
//! );
//! let config = ExperimentConfig::default()
//!     .with_budget(BudgetConfig::default().with_max_evaluations(100))
//!     .with_penalties(PenaltyConfig::calibrated(&instance, 1.0))
//!     .with_operators(AlnsConfig::default().with_seed(42));
//!
//! let problem = RoutingProblem::new(instance, &config)?;
//! let result = AlnsRunner::run_default(&problem, &config.operators)?;
//! assert!(result.evaluations_used <= 100);
//! assert!(result.best.covers_targets_exactly_once(problem.instance()));
//! # Ok::<(), ca_alns::CaAlnsError>(())
//! ```

pub mod alns;
pub mod baselines;
pub mod connectivity;
pub mod eval;
pub mod model;
pub mod surrogate;

mod config;
mod error;
mod problem;
mod result;

pub use config::ExperimentConfig;
pub use error::{CaAlnsError, Result};
pub use problem::RoutingProblem;
pub use result::RunResult;
