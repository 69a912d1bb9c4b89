//! Error types for the betting-decision core.
//!
//! Only structural failures live here. Conditions that merely mean "no
//! signal" (invalid odds, degenerate markets, short histories) are reported
//! through return values and skip counters instead.

use thiserror::Error;

/// Errors raised by a probability model while fitting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// No training rows were supplied.
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// Every training label belongs to the same class.
    #[error("training labels contain a single class only ({n_samples} samples)")]
    SingleClass {
        /// Number of rows in the rejected training window.
        n_samples: usize,
    },

    /// A feature value was NaN or infinite.
    #[error("non-finite feature value at row {row}, column {column}")]
    NonFiniteInput {
        /// Row index within the training window.
        row: usize,
        /// Column index within the feature vector.
        column: usize,
    },

    /// Rows disagree on the number of features, or labels do not line up with rows.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },
}

/// Errors surfaced by the core and the backtester.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// Configuration values are malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The injected model failed to fit a training window.
    #[error("model fitting failed at step {step} (match {match_id}): {source}")]
    ModelFitting {
        /// Index of the walk-forward step.
        step: usize,
        /// Identifier of the match being scored.
        match_id: i64,
        /// Underlying model failure.
        #[source]
        source: ModelError,
    },

    /// Input data could not be interpreted.
    #[error("dataset error: {0}")]
    Dataset(String),
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, EdgeError>;
