//! Frozen logistic classifier flagging snapshots at connectivity risk.
//!
//! The model is trained offline and shipped as a JSON artifact:
//!
//! ```json
//! { "w": [..], "b": 0.0, "tau": 0.5, "mu": [..], "sigma": [..], "band": 0.05 }
//! ```
//!
//! It is advisory only: a high score triggers a closer look, it never
//! replaces the exact reachability check.

use crate::error::{CaAlnsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_band() -> f64 {
    0.05
}

/// A read-only logistic model over standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenSurrogate {
    pub w: Vec<f64>,
    pub b: f64,
    /// Decision threshold on the score.
    pub tau: f64,
    pub mu: Vec<f64>,
    pub sigma: Vec<f64>,
    /// Half-width of the borderline band around `tau`.
    #[serde(default = "default_band")]
    pub band: f64,
}

impl FrozenSurrogate {
    /// Loads and validates the artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CaAlnsError::SurrogateIo {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), features = model.w.len(), "loaded surrogate");
        Ok(model)
    }

    /// Parses and validates an artifact held in memory.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(text).map_err(CaAlnsError::SurrogateFormat)?;
        model.validate().map_err(CaAlnsError::SurrogateShape)?;
        Ok(model)
    }

    /// Checks vector lengths and finiteness.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.w.len();
        if n == 0 {
            return Err("weight vector is empty".into());
        }
        if self.mu.len() != n || self.sigma.len() != n {
            return Err(format!(
                "length mismatch: w={}, mu={}, sigma={}",
                n,
                self.mu.len(),
                self.sigma.len()
            ));
        }
        let all_finite = self
            .w
            .iter()
            .chain(&self.mu)
            .chain(&self.sigma)
            .chain([&self.b, &self.tau, &self.band])
            .all(|v| v.is_finite());
        if !all_finite {
            return Err("parameters must be finite".into());
        }
        if !(0.0..=1.0).contains(&self.tau) {
            return Err(format!("tau must lie in [0, 1], got {}", self.tau));
        }
        if self.band < 0.0 {
            return Err(format!("band must be non-negative, got {}", self.band));
        }
        Ok(())
    }

    pub fn feature_count(&self) -> usize {
        self.w.len()
    }

    /// Risk probability `sigmoid(w . (x - mu) / sigma + b)`.
    ///
    /// Missing trailing features are treated as equal to their mean; extra
    /// features are ignored.
    pub fn score(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .w
            .iter()
            .zip(&self.mu)
            .zip(&self.sigma)
            .enumerate()
            .map(|(i, ((w, mu), sigma))| {
                let x = features.get(i).copied().unwrap_or(*mu);
                w * (x - mu) / sigma.max(1e-9)
            })
            .sum::<f64>()
            + self.b;
        1.0 / (1.0 + (-z).exp())
    }

    /// `|score - tau| < band`.
    pub fn is_borderline(&self, score: f64) -> bool {
        (score - self.tau).abs() < self.band
    }

    /// `score >= tau` or borderline.
    pub fn is_risky(&self, score: f64) -> bool {
        score >= self.tau || self.is_borderline(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ARTIFACT: &str = r#"{
        "w": [1.0, -0.5, -2.0],
        "b": 0.0,
        "tau": 0.5,
        "mu": [100.0, 2.0, 1.0],
        "sigma": [50.0, 1.0, 0.5],
        "band": 0.05
    }"#;

    #[test]
    fn test_score_at_mean_is_sigmoid_of_bias() {
        let s = FrozenSurrogate::from_json_str(ARTIFACT).unwrap();
        assert!((s.score(&[100.0, 2.0, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_score_monotone_in_spread() {
        let s = FrozenSurrogate::from_json_str(ARTIFACT).unwrap();
        let tight = s.score(&[50.0, 2.0, 1.0]);
        let spread = s.score(&[300.0, 2.0, 1.0]);
        assert!(tight < 0.5 && spread > 0.5);
        assert!((0.0..=1.0).contains(&spread));
    }

    #[test]
    fn test_borderline_band() {
        let s = FrozenSurrogate::from_json_str(ARTIFACT).unwrap();
        assert!(s.is_borderline(0.52));
        assert!(s.is_borderline(0.46));
        assert!(!s.is_borderline(0.56));
        assert!(s.is_risky(0.9));
        assert!(s.is_risky(0.47));
        assert!(!s.is_risky(0.2));
    }

    #[test]
    fn test_band_defaults_when_absent() {
        let s = FrozenSurrogate::from_json_str(
            r#"{"w":[1.0],"b":0.0,"tau":0.5,"mu":[0.0],"sigma":[1.0]}"#,
        )
        .unwrap();
        assert!((s.band - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_artifact_is_rejected() {
        let err = FrozenSurrogate::from_json_str(r#"{"w":[1.0],"b":0.0}"#).unwrap_err();
        assert!(matches!(err, CaAlnsError::SurrogateFormat(_)));

        let err = FrozenSurrogate::from_json_str(
            r#"{"w":[1.0, 2.0],"b":0.0,"tau":0.5,"mu":[0.0],"sigma":[1.0]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CaAlnsError::SurrogateShape(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARTIFACT.as_bytes()).unwrap();
        let s = FrozenSurrogate::load(file.path()).unwrap();
        assert_eq!(s.feature_count(), 3);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = FrozenSurrogate::load("/definitely/not/here/surrogate.json").unwrap_err();
        assert!(matches!(err, CaAlnsError::SurrogateIo { .. }));
    }
}
