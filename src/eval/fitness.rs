//! Scalar objective.

use super::penalty::PenaltyConfig;
use crate::model::SolutionMetrics;

/// Penalized cost of `metrics` under `penalties`. Lower is better.
///
/// ```text
/// alpha * travel
///   + lambda_disc [!connected] + lambda_cap [!payload_ok] + lambda_bat [!battery_ok]
///   + lambda_bal * max(0, W_max - W_min)
///   + lambda_wait * max(0, wait) + lambda_rp * rally_points
///   + lambda_makespan [makespan > H_max]
/// ```
pub fn fitness_value(metrics: &SolutionMetrics, penalties: &PenaltyConfig) -> f64 {
    let mut cost = penalties.alpha * metrics.total_travel();
    if !metrics.is_connected() {
        cost += penalties.lambda_disc;
    }
    if !metrics.is_payload_ok() {
        cost += penalties.lambda_cap;
    }
    if !metrics.is_battery_ok() {
        cost += penalties.lambda_bat;
    }
    cost += penalties.lambda_bal * (metrics.workload_max() - metrics.workload_min()).max(0.0);
    cost += penalties.lambda_wait * metrics.rally_wait_sum().max(0.0);
    cost += penalties.lambda_rp * metrics.rally_points_count() as f64;
    if let Some(h_max) = penalties.makespan_threshold {
        if metrics.makespan() > h_max {
            cost += penalties.lambda_makespan;
        }
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feasible(travel: f64) -> SolutionMetrics {
        SolutionMetrics {
            total_travel: Some(travel),
            workload_max: Some(travel / 2.0),
            workload_min: Some(travel / 2.0),
            makespan: Some(10.0),
            connected: Some(true),
            payload_ok: Some(true),
            battery_ok: Some(true),
            rally_points_count: Some(0),
            rally_wait_sum: Some(0.0),
            snapshots_connected_pct: Some(100.0),
        }
    }

    fn heavy() -> PenaltyConfig {
        PenaltyConfig::default()
            .with_alpha(2.5)
            .with_hard_penalties(1e4)
            .with_balance_weight(1.0)
            .with_rally_weights(1.0, 1.0)
            .with_makespan(100.0, 50.0)
    }

    #[test]
    fn test_feasible_cost_is_weighted_travel() {
        assert_eq!(fitness_value(&feasible(123.0), &heavy()), 2.5 * 123.0);
    }

    #[test]
    fn test_hard_penalties_add_up() {
        let mut m = feasible(10.0);
        m.connected = Some(false);
        m.battery_ok = Some(false);
        assert_eq!(fitness_value(&m, &heavy()), 25.0 + 2e4);
    }

    #[test]
    fn test_soft_terms() {
        let mut m = feasible(10.0);
        m.workload_max = Some(8.0);
        m.workload_min = Some(2.0);
        m.rally_points_count = Some(2);
        m.rally_wait_sum = Some(10.0);
        m.makespan = Some(101.0);
        assert_eq!(fitness_value(&m, &heavy()), 25.0 + 6.0 + 10.0 + 2.0 + 50.0);
    }

    #[test]
    fn test_makespan_at_threshold_is_free() {
        let mut m = feasible(10.0);
        m.makespan = Some(100.0);
        assert_eq!(fitness_value(&m, &heavy()), 25.0);
    }

    #[test]
    fn test_missing_fields_are_neutral() {
        let m = SolutionMetrics::default();
        let p = PenaltyConfig::default().with_hard_penalties(1e4);
        assert_eq!(fitness_value(&m, &p), 0.0);
    }
}
