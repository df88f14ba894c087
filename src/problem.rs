//! A validated routing problem: instance plus everything needed to score it.

use crate::config::ExperimentConfig;
use crate::connectivity::{cadence_bound, ConnectivityScreen, ScreenPolicy};
use crate::error::{CaAlnsError, Result};
use crate::eval::{BudgetConfig, PenaltyConfig};
use crate::model::{Instance, Solution, SolutionMetrics};
use crate::surrogate::FrozenSurrogate;
use std::path::Path;

/// Instance, connectivity screen, final penalty weights and budget.
///
/// Construction validates the instance and every configuration section, so
/// the search loops never see an invalid setup.
///
/// # Examples
///
/// ```
/// use ca_alns::model::{Instance, Node, Uav};
/// use ca_alns::{ExperimentConfig, RoutingProblem};
///
/// let instance = Instance::new(
///     Node::new(0, 0.0, 0.0),
///     vec![Node::new(1, 30.0, 0.0), Node::new(2, -30.0, 0.0)],
///     vec![Uav::new(0), Uav::new(1)],
/// );
/// let problem = RoutingProblem::new(instance, &ExperimentConfig::default()).unwrap();
/// let metrics = problem.measure(&problem.initial_solution());
/// assert_eq!(metrics.connected, Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct RoutingProblem {
    instance: Instance,
    screen: ConnectivityScreen,
    penalties: PenaltyConfig,
    budget: BudgetConfig,
}

impl RoutingProblem {
    /// Builds a problem from `instance` and the relevant sections of `config`.
    ///
    /// The cadence bound uses the faster of `connectivity.max_speed` and the
    /// fastest vehicle of the fleet, so no disconnection falls between two
    /// snapshots. An explicit `delta_tau` is used as given.
    ///
    /// # Errors
    ///
    /// [`CaAlnsError::InvalidConfig`] when the instance or a section fails
    /// validation.
    pub fn new(instance: Instance, config: &ExperimentConfig) -> Result<Self> {
        instance
            .validate()
            .map_err(|e| CaAlnsError::InvalidConfig(format!("instance: {e}")))?;
        config.validate().map_err(CaAlnsError::InvalidConfig)?;

        let mut connectivity = config.connectivity.clone();
        let fleet_speed = instance.max_fleet_speed();
        if fleet_speed > connectivity.max_speed {
            tracing::debug!(
                configured = connectivity.max_speed,
                fleet = fleet_speed,
                "fleet outpaces configured speed bound; tightening snapshot cadence"
            );
            connectivity.max_speed = fleet_speed;
        }
        let bound = cadence_bound(
            connectivity.range,
            connectivity.safety_margin,
            connectivity.max_speed,
        );
        if connectivity.delta_tau.is_some_and(|dt| dt > bound) {
            tracing::warn!(
                delta_tau = ?connectivity.delta_tau,
                bound,
                "explicit snapshot interval exceeds the cadence bound"
            );
        }

        Ok(Self {
            instance,
            screen: ConnectivityScreen::new(connectivity),
            penalties: config.penalties.clone().into_final(),
            budget: config.budget.clone(),
        })
    }

    pub fn with_surrogate(mut self, surrogate: FrozenSurrogate) -> Self {
        self.screen = self.screen.with_surrogate(surrogate);
        self
    }

    /// Loads the surrogate artifact at `path` and attaches it.
    pub fn with_surrogate_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let surrogate = FrozenSurrogate::load(path)?;
        Ok(self.with_surrogate(surrogate))
    }

    pub fn with_screen_policy(mut self, policy: ScreenPolicy) -> Self {
        self.screen = self.screen.with_policy(policy);
        self
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn screen(&self) -> &ConnectivityScreen {
        &self.screen
    }

    /// Final-phase penalty weights.
    pub fn penalties(&self) -> &PenaltyConfig {
        &self.penalties
    }

    pub fn budget(&self) -> &BudgetConfig {
        &self.budget
    }

    /// Round-robin starting plan.
    pub fn initial_solution(&self) -> Solution {
        Solution::round_robin(&self.instance)
    }

    pub fn measure(&self, solution: &Solution) -> SolutionMetrics {
        self.screen.measure(solution, &self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Uav};
    use std::io::Write;

    fn instance() -> Instance {
        Instance::new(
            Node::new(0, 0.0, 0.0),
            vec![Node::new(1, 10.0, 0.0)],
            vec![Uav::new(0)],
        )
    }

    #[test]
    fn test_rejects_empty_fleet() {
        let inst = Instance::new(Node::new(0, 0.0, 0.0), vec![], vec![]);
        let err = RoutingProblem::new(inst, &ExperimentConfig::default()).unwrap_err();
        assert!(matches!(err, CaAlnsError::InvalidConfig(ref m) if m.starts_with("instance")));
    }

    #[test]
    fn test_fast_fleet_tightens_snapshot_cadence() {
        // Default bound assumes 15 units/s; these vehicles fly at 100.
        let inst = Instance::new(
            Node::new(0, 0.0, 0.0),
            vec![Node::new(1, 100.0, 0.0), Node::new(2, -100.0, 0.0)],
            vec![
                Uav::new(0).with_max_speed(100.0),
                Uav::new(1).with_max_speed(100.0),
            ],
        );
        let problem = RoutingProblem::new(inst, &ExperimentConfig::default()).unwrap();
        // (150 - 2 * 15) / (2 * 100)
        assert!((problem.screen().delta_tau() - 0.6).abs() < 1e-12);

        // At t = 1.2 both fly home from ±100: 160 apart, beyond the 135 range.
        let metrics = problem.measure(&problem.initial_solution());
        assert_eq!(metrics.connected, Some(false));
    }

    #[test]
    fn test_slow_fleet_keeps_configured_cadence() {
        let problem = RoutingProblem::new(instance(), &ExperimentConfig::default()).unwrap();
        assert!((problem.screen().delta_tau() - 4.0).abs() < 1e-12);
        assert_eq!(problem.screen().config().max_speed, 15.0);
    }

    #[test]
    fn test_penalties_forced_final() {
        let mut config = ExperimentConfig::default();
        config.penalties = config.penalties.warmup(1.0, 0.5);
        let problem = RoutingProblem::new(instance(), &config).unwrap();
        assert_eq!(problem.penalties().phase, crate::eval::Phase::Final);
    }

    #[test]
    fn test_surrogate_file_errors_propagate() {
        let problem = RoutingProblem::new(instance(), &ExperimentConfig::default()).unwrap();
        let err = problem
            .clone()
            .with_surrogate_file("/nonexistent/surrogate.json")
            .unwrap_err();
        assert!(matches!(err, CaAlnsError::SurrogateIo { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"w":[1.0,1.0,1.0],"b":0.0,"tau":0.5,"mu":[0,0,0],"sigma":[1,1,1]}}"#
        )
        .unwrap();
        let problem = problem.with_surrogate_file(file.path()).unwrap();
        assert!(problem.screen().surrogate().is_some());
    }
}
