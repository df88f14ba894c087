//! Crate-wide error type.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CaAlnsError>;

/// Errors raised by the search engine and its collaborators.
///
/// Everything except [`CaAlnsError::InvalidConfig`] is fatal to the run that
/// produced it. Budget overflow in particular signals an accounting bug: the
/// search loop stops on its own budget check before the evaluator refuses.
#[derive(Debug, thiserror::Error)]
pub enum CaAlnsError {
    /// An evaluation would push the used-count past the configured maximum.
    #[error("evaluation budget exceeded: used={used} > max={max}")]
    EvaluationBudgetExceeded { used: usize, max: usize },

    /// The surrogate artifact could not be read.
    #[error("cannot read surrogate artifact {path}: {source}")]
    SurrogateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The surrogate artifact is not valid JSON of the expected shape.
    #[error("malformed surrogate artifact: {0}")]
    SurrogateFormat(#[source] serde_json::Error),

    /// The surrogate vectors disagree in length or contain invalid values.
    #[error("inconsistent surrogate model: {0}")]
    SurrogateShape(String),

    /// A configuration or instance was rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A run result could not be written.
    #[error("cannot write run result {path}: {source}")]
    ResultIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CaAlnsError {
    /// Returns `true` for the budget overflow condition.
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, CaAlnsError::EvaluationBudgetExceeded { .. })
    }
}
