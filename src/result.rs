//! Per-run result record.

use crate::error::{CaAlnsError, Result};
use crate::model::SolutionMetrics;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat summary of one algorithm run, one JSON object per run.
///
/// Missing values serialize as `null`. In particular `fitness` is `null`
/// when the reported plan was modified after its last evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub algorithm: Option<String>,
    pub seed: Option<u64>,
    pub total_travel: Option<f64>,
    pub fitness: Option<f64>,
    pub connected: Option<bool>,
    pub snapshots_connected_pct: Option<f64>,
    #[serde(rename = "E_used")]
    pub evaluations_used: Option<usize>,
    pub wallclock_s: Option<f64>,
    /// Estimated energy of the run in Wh.
    #[serde(rename = "E_wh")]
    pub energy_wh: Option<f64>,
    pub workload_max: Option<f64>,
    pub workload_min: Option<f64>,
    pub makespan: Option<f64>,
    pub payload_ok: Option<bool>,
    pub battery_ok: Option<bool>,
    pub rally_points_count: Option<usize>,
    pub rally_wait_sum: Option<f64>,
}

impl RunResult {
    /// Copies the solution-level fields out of `metrics`.
    pub fn from_metrics(metrics: &SolutionMetrics) -> Self {
        Self {
            total_travel: metrics.total_travel,
            connected: metrics.connected,
            snapshots_connected_pct: metrics.snapshots_connected_pct,
            workload_max: metrics.workload_max,
            workload_min: metrics.workload_min,
            makespan: metrics.makespan,
            payload_ok: metrics.payload_ok,
            battery_ok: metrics.battery_ok,
            rally_points_count: metrics.rally_points_count,
            rally_wait_sum: metrics.rally_wait_sum,
            ..Default::default()
        }
    }

    pub fn with_algorithm(mut self, name: impl Into<String>) -> Self {
        self.algorithm = Some(name.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fitness(mut self, fitness: Option<f64>) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn with_evaluations(mut self, used: usize) -> Self {
        self.evaluations_used = Some(used);
        self
    }

    pub fn with_wallclock(mut self, seconds: f64) -> Self {
        self.wallclock_s = Some(seconds);
        self
    }

    pub fn with_energy(mut self, e_wh: f64) -> Self {
        self.energy_wh = Some(e_wh);
        self
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the record as pretty JSON to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_json_string()?;
        std::fs::write(path, text).map_err(|source| CaAlnsError::ResultIo {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote run result");
        Ok(())
    }
}
