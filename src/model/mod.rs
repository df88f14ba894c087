//! Problem and solution model.
//!
//! - [`Instance`]: depot, targets and fleet; read-only for a run
//! - [`Solution`]: one depot-to-depot route per vehicle
//! - [`SolutionMetrics`]: evaluator-facing summary with defaulted fields

mod instance;
mod metrics;
mod solution;

pub use instance::{Instance, Node, NodeId, Point, Uav, UavId};
pub use metrics::{canonical_json, fingerprint_value, SolutionMetrics};
pub use solution::{insertion_delta, route_length, RouteItem, RouteItemKind, Solution};
