//! Connectivity configuration.

use super::snapshot::cadence_bound;
use serde::{Deserialize, Serialize};

/// Link model used to decide whether two vehicles can communicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LinkModel {
    /// Edge iff distance `<= max(0, R - rho)`.
    Range,

    /// Edge iff the log-distance SNR clears `snr_threshold_db`.
    SignalQuality(SignalParams),
}

/// Parameters of the log-distance path-loss link model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    pub tx_power_dbm: f64,
    pub noise_dbm: f64,
    /// Aggregate interference power; `None` means no interference.
    pub interference_dbm: Option<f64>,
    pub snr_threshold_db: f64,
    /// Require the threshold in both directions.
    pub bidirectional: bool,
    /// Reference path loss at 1 unit of distance.
    pub pl0_db: f64,
    pub los_exponent: f64,
    pub nlos_exponent: f64,
    /// Links shorter than this are treated as line-of-sight.
    pub los_distance: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            tx_power_dbm: 20.0,
            noise_dbm: -96.0,
            interference_dbm: None,
            snr_threshold_db: 6.0,
            bidirectional: true,
            pl0_db: 32.4,
            los_exponent: 2.1,
            nlos_exponent: 3.0,
            los_distance: 500.0,
        }
    }
}

/// Connectivity parameters shared by the graph builder and the cadence bound.
///
/// # Examples
///
/// ```
/// use ca_alns::connectivity::ConnectivityConfig;
///
/// let config = ConnectivityConfig::default()
///     .with_range(200.0, 20.0)
///     .with_max_speed(12.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub link_model: LinkModel,

    /// Nominal radio range `R`.
    pub range: f64,

    /// Safety margin `rho` subtracted from `R`.
    pub safety_margin: f64,

    /// Fleet speed bound used by the cadence bound and as default speed.
    pub max_speed: f64,

    /// Explicit snapshot interval overriding the cadence bound.
    pub delta_tau: Option<f64>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            link_model: LinkModel::Range,
            range: 150.0,
            safety_margin: 15.0,
            max_speed: 15.0,
            delta_tau: None,
        }
    }
}

impl ConnectivityConfig {
    pub fn with_range(mut self, range: f64, safety_margin: f64) -> Self {
        self.range = range;
        self.safety_margin = safety_margin;
        self
    }

    pub fn with_max_speed(mut self, speed: f64) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn with_link_model(mut self, model: LinkModel) -> Self {
        self.link_model = model;
        self
    }

    pub fn with_delta_tau(mut self, delta_tau: f64) -> Self {
        self.delta_tau = Some(delta_tau);
        self
    }

    /// Tightened range `max(0, R - rho)`.
    pub fn effective_range(&self) -> f64 {
        (self.range - self.safety_margin).max(0.0)
    }

    /// Snapshot interval: the explicit override, else the cadence bound.
    pub fn snapshot_interval(&self) -> f64 {
        self.delta_tau
            .unwrap_or_else(|| cadence_bound(self.range, self.safety_margin, self.max_speed))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.range > 0.0) {
            return Err(format!("range must be positive, got {}", self.range));
        }
        if self.safety_margin < 0.0 {
            return Err(format!(
                "safety_margin must be non-negative, got {}",
                self.safety_margin
            ));
        }
        if self.range - 2.0 * self.safety_margin <= 0.0 {
            return Err("range must exceed twice the safety margin".into());
        }
        if !(self.max_speed > 0.0) {
            return Err(format!("max_speed must be positive, got {}", self.max_speed));
        }
        if let Some(dt) = self.delta_tau {
            if !(dt > 0.0) {
                return Err(format!("delta_tau must be positive, got {dt}"));
            }
        }
        if let LinkModel::SignalQuality(params) = &self.link_model {
            if params.los_exponent <= 0.0 || params.nlos_exponent <= 0.0 {
                return Err("path-loss exponents must be positive".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectivityConfig::default();
        assert_eq!(config.link_model, LinkModel::Range);
        assert!((config.effective_range() - 135.0).abs() < 1e-12);
        assert!((config.snapshot_interval() - 4.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_delta_tau_overrides_bound() {
        let config = ConnectivityConfig::default().with_delta_tau(1.5);
        assert_eq!(config.snapshot_interval(), 1.5);
    }

    #[test]
    fn test_effective_range_floors_at_zero() {
        let config = ConnectivityConfig::default().with_range(10.0, 20.0);
        assert_eq!(config.effective_range(), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ConnectivityConfig::default()
            .with_range(-1.0, 0.0)
            .validate()
            .is_err());
        assert!(ConnectivityConfig::default()
            .with_range(100.0, 50.0)
            .validate()
            .is_err());
        assert!(ConnectivityConfig::default()
            .with_max_speed(0.0)
            .validate()
            .is_err());
        assert!(ConnectivityConfig::default()
            .with_delta_tau(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_link_model_json_tag() {
        let config = ConnectivityConfig::default()
            .with_link_model(LinkModel::SignalQuality(SignalParams::default()));
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains("\"mode\":\"signal_quality\""));
        let back: ConnectivityConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
