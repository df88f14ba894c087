//! Snapshot-level connectivity verification and solution metrics.

use super::config::ConnectivityConfig;
use super::features::SnapshotFeatures;
use super::graph::{build_graph, is_connected, Positions};
use super::snapshot::{simulate_snapshots, Snapshot};
use crate::model::{route_length, Instance, Solution, SolutionMetrics};
use crate::surrogate::FrozenSurrogate;

/// How the surrogate verdict interacts with the exact check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenPolicy {
    /// Always run BFS. The surrogate only flags snapshots for repair.
    #[default]
    AlwaysVerify,

    /// Trust a confident low-risk surrogate verdict without BFS.
    SkipLowRisk,
}

/// Surrogate output for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub borderline: bool,
    /// Score at or above the threshold, or borderline.
    pub risky: bool,
}

/// Outcome of checking one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotVerdict {
    pub connected: bool,
    /// Whether BFS actually ran.
    pub verified: bool,
    pub risk: Option<RiskAssessment>,
}

impl SnapshotVerdict {
    /// Disconnected, or flagged by the surrogate.
    pub fn needs_attention(&self) -> bool {
        !self.connected || self.risk.is_some_and(|r| r.risky)
    }
}

/// Connectivity summary of a whole mission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityReport {
    pub snapshots: usize,
    pub connected_snapshots: usize,
    pub first_disconnected: Option<usize>,
}

impl ConnectivityReport {
    pub fn connected(&self) -> bool {
        self.connected_snapshots == self.snapshots
    }

    /// Percentage of connected snapshots; 100 for an empty mission.
    pub fn connected_pct(&self) -> f64 {
        if self.snapshots == 0 {
            100.0
        } else {
            100.0 * self.connected_snapshots as f64 / self.snapshots as f64
        }
    }
}

/// Verifies routes snapshot by snapshot, optionally consulting a surrogate.
///
/// The snapshot interval is derived once at construction.
#[derive(Debug, Clone)]
pub struct ConnectivityScreen {
    config: ConnectivityConfig,
    delta_tau: f64,
    surrogate: Option<FrozenSurrogate>,
    policy: ScreenPolicy,
}

impl ConnectivityScreen {
    pub fn new(config: ConnectivityConfig) -> Self {
        let delta_tau = config.snapshot_interval();
        Self {
            config,
            delta_tau,
            surrogate: None,
            policy: ScreenPolicy::default(),
        }
    }

    pub fn with_surrogate(mut self, surrogate: FrozenSurrogate) -> Self {
        self.surrogate = Some(surrogate);
        self
    }

    pub fn with_policy(mut self, policy: ScreenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &ConnectivityConfig {
        &self.config
    }

    pub fn delta_tau(&self) -> f64 {
        self.delta_tau
    }

    pub fn surrogate(&self) -> Option<&FrozenSurrogate> {
        self.surrogate.as_ref()
    }

    pub fn snapshots(&self, solution: &Solution, instance: &Instance) -> Vec<Snapshot> {
        simulate_snapshots(solution, instance, self.delta_tau, self.config.max_speed)
    }

    /// Checks one snapshot.
    pub fn check(&self, positions: &Positions) -> SnapshotVerdict {
        let adj = build_graph(positions, &self.config);
        let risk = self.surrogate.as_ref().map(|s| {
            let score = s.score(&SnapshotFeatures::compute(positions, &adj).to_vec());
            RiskAssessment {
                score,
                borderline: s.is_borderline(score),
                risky: s.is_risky(score),
            }
        });

        let skip = self.policy == ScreenPolicy::SkipLowRisk && risk.is_some_and(|r| !r.risky);
        if skip {
            return SnapshotVerdict {
                connected: true,
                verified: false,
                risk,
            };
        }
        SnapshotVerdict {
            connected: is_connected(&adj),
            verified: true,
            risk,
        }
    }

    /// Checks every snapshot of the mission.
    pub fn assess(&self, solution: &Solution, instance: &Instance) -> ConnectivityReport {
        let snapshots = self.snapshots(solution, instance);
        let mut connected_snapshots = 0;
        let mut first_disconnected = None;
        for (k, snap) in snapshots.iter().enumerate() {
            if self.check(&snap.positions).connected {
                connected_snapshots += 1;
            } else if first_disconnected.is_none() {
                first_disconnected = Some(k);
            }
        }
        ConnectivityReport {
            snapshots: snapshots.len(),
            connected_snapshots,
            first_disconnected,
        }
    }

    /// Computes the full metrics of `solution`.
    pub fn measure(&self, solution: &Solution, instance: &Instance) -> SolutionMetrics {
        let report = self.assess(solution, instance);
        let (workload_max, workload_min) = solution.workload_extrema();

        let payload_ok = instance
            .uavs
            .iter()
            .all(|u| solution.target_count(u.id) as f64 <= u.payload_capacity);
        let battery_ok = instance.uavs.iter().all(|u| {
            solution
                .route(u.id)
                .map_or(true, |r| route_length(r) <= u.battery_capacity)
        });

        SolutionMetrics {
            total_travel: Some(solution.total_travel()),
            workload_max: Some(workload_max),
            workload_min: Some(workload_min),
            makespan: Some(solution.makespan(instance, self.config.max_speed)),
            connected: Some(report.connected()),
            payload_ok: Some(payload_ok),
            battery_ok: Some(battery_ok),
            rally_points_count: Some(solution.rally_point_count()),
            rally_wait_sum: Some(solution.rally_wait_sum()),
            snapshots_connected_pct: Some(report.connected_pct()),
        }
    }
}
