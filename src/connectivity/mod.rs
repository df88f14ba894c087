//! Connectivity verification.
//!
//! Vehicle positions are sampled at a fixed cadence along their routes; at
//! each snapshot a communication graph is built under a range or
//! signal-quality link model and checked for reachability.
//!
//! # Key Types
//!
//! - [`ConnectivityConfig`]: link model, range, safety margin, speed bound
//! - [`ConnectivityScreen`]: snapshot verification plus solution metrics
//! - [`Snapshot`]: interpolated fleet positions at one instant
//!
//! # Cadence
//!
//! With nominal range `R`, safety margin `rho` and speed bound `v_max`,
//! checking every `(R - 2 rho) / (2 v_max)` time units cannot miss a link
//! break: in that interval a pair drifts apart by at most `R - 2 rho`.

mod config;
mod features;
mod graph;
mod screen;
mod signal;
mod snapshot;

pub use config::{ConnectivityConfig, LinkModel, SignalParams};
pub use features::{algebraic_connectivity, avg_degree, mst_max_edge_length, SnapshotFeatures};
pub use graph::{build_graph, edge_count, is_connected, Adjacency, Positions};
pub use screen::{
    ConnectivityReport, ConnectivityScreen, RiskAssessment, ScreenPolicy, SnapshotVerdict,
};
pub use signal::{link_ok, link_snr_db, path_loss_db, rx_power_dbm, snr_db};
pub use snapshot::{cadence_bound, simulate_snapshots, Snapshot, Timeline, MIN_DELTA_TAU};
