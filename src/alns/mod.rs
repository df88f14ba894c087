//! Connectivity-aware Adaptive Large Neighborhood Search (CA-ALNS).
//!
//! CA-ALNS iteratively destroys and repairs multi-UAV routing plans using a
//! portfolio of operators whose selection probabilities adapt based on past
//! performance. Acceptance follows simulated annealing; hard penalties are
//! softened during a short warm-up and then locked at their final values.
//! Connectivity breaks are patched with rally points.
//!
//! # References
//!
//! Ropke & Pisinger (2006), "An Adaptive Large Neighborhood Search Heuristic
//! for the Pickup and Delivery Problem with Time Windows"

mod config;
mod operators;
mod rally;
mod runner;
mod types;

pub use config::AlnsConfig;
pub use operators::{
    mean_insertion_cost, DestroyKind, GreedyInsertion, RandomInsertion, RandomRemoval,
    RegretInsertion, RepairKind, SegmentRemoval, WorstRemoval,
};
pub use rally::{RallyInsertion, RallyRepair, MIN_RALLY_WAIT};
#[cfg(feature = "parallel")]
pub use runner::run_seeds;
pub use runner::{AlnsResult, AlnsRunner, MIN_INITIAL_TEMPERATURE};
pub use types::{DestroyOperator, PartialSolution, RepairOperator};
