//! Evaluator-facing summary of a solution.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Derived metrics of a [`Solution`](super::Solution).
///
/// Every field is optional. An absent field takes the neutral value exposed
/// by its accessor (travel 0, flags `true`, counters 0), so operators only
/// fill in what they know.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolutionMetrics {
    pub total_travel: Option<f64>,
    pub workload_max: Option<f64>,
    pub workload_min: Option<f64>,
    pub makespan: Option<f64>,
    pub connected: Option<bool>,
    pub payload_ok: Option<bool>,
    pub battery_ok: Option<bool>,
    pub rally_points_count: Option<usize>,
    pub rally_wait_sum: Option<f64>,
    /// Share of connectivity snapshots that were connected, in percent.
    pub snapshots_connected_pct: Option<f64>,
}

impl SolutionMetrics {
    pub fn total_travel(&self) -> f64 {
        self.total_travel.unwrap_or(0.0)
    }

    /// Defaults to the total travel (one vehicle doing all the work).
    pub fn workload_max(&self) -> f64 {
        self.workload_max.unwrap_or_else(|| self.total_travel())
    }

    pub fn workload_min(&self) -> f64 {
        self.workload_min.unwrap_or(0.0)
    }

    pub fn makespan(&self) -> f64 {
        self.makespan.unwrap_or(0.0)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(true)
    }

    pub fn is_payload_ok(&self) -> bool {
        self.payload_ok.unwrap_or(true)
    }

    pub fn is_battery_ok(&self) -> bool {
        self.battery_ok.unwrap_or(true)
    }

    pub fn rally_points_count(&self) -> usize {
        self.rally_points_count.unwrap_or(0)
    }

    pub fn rally_wait_sum(&self) -> f64 {
        self.rally_wait_sum.unwrap_or(0.0)
    }

    /// Sets any unset feasibility flag to `true`.
    pub fn ensure_feasibility_flags(&mut self) {
        self.connected.get_or_insert(true);
        self.payload_ok.get_or_insert(true);
        self.battery_ok.get_or_insert(true);
    }

    /// `true` only when all three hard flags are explicitly set and hold.
    pub fn is_feasible(&self) -> bool {
        self.connected == Some(true)
            && self.payload_ok == Some(true)
            && self.battery_ok == Some(true)
    }

    /// Order-independent SHA-256 fingerprint of the metrics.
    ///
    /// The metrics are serialized to JSON, every object is re-emitted with
    /// sorted keys, and the resulting string is hashed.
    pub fn fingerprint(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(fingerprint_value(&value))
    }
}

/// SHA-256 hex digest of the canonical form of `value`.
pub fn fingerprint_value(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(value).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map.iter().collect();
            let body: Vec<String> = sorted
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_json(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_neutral() {
        let m = SolutionMetrics::default();
        assert_eq!(m.total_travel(), 0.0);
        assert!(m.is_connected());
        assert!(m.is_payload_ok());
        assert!(m.is_battery_ok());
        assert_eq!(m.rally_points_count(), 0);
        assert!(!m.is_feasible());
    }

    #[test]
    fn test_workload_max_defaults_to_travel() {
        let m = SolutionMetrics {
            total_travel: Some(42.0),
            ..Default::default()
        };
        assert_eq!(m.workload_max(), 42.0);
        assert_eq!(m.workload_min(), 0.0);
    }

    #[test]
    fn test_ensure_flags_keeps_explicit_false() {
        let mut m = SolutionMetrics {
            connected: Some(false),
            ..Default::default()
        };
        m.ensure_feasibility_flags();
        assert_eq!(m.connected, Some(false));
        assert_eq!(m.payload_ok, Some(true));
        assert_eq!(m.battery_ok, Some(true));
        assert!(!m.is_feasible());
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let a = json!({"b": 1, "a": {"y": [1, {"q": 2, "p": 1}], "x": null}});
        assert_eq!(
            canonical_json(&a),
            r#"{"a":{"x":null,"y":[1,{"p":1,"q":2}]},"b":1}"#
        );
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"total_travel": 10.5, "connected": true}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"connected": true, "total_travel": 10.5}"#).unwrap();
        assert_eq!(fingerprint_value(&a), fingerprint_value(&b));
    }

    #[test]
    fn test_fingerprint_distinguishes_values() {
        let a = SolutionMetrics {
            total_travel: Some(1.0),
            ..Default::default()
        };
        let b = SolutionMetrics {
            total_travel: Some(2.0),
            ..Default::default()
        };
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap(), a.clone().fingerprint().unwrap());
    }

    proptest! {
        #[test]
        fn prop_fingerprint_is_hex_sha256(travel in 0.0f64..1e6, rp in 0usize..10) {
            let m = SolutionMetrics {
                total_travel: Some(travel),
                rally_points_count: Some(rp),
                ..Default::default()
            };
            let fp = m.fingerprint().unwrap();
            prop_assert_eq!(fp.len(), 64);
            prop_assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
