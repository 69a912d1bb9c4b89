//! Trainable probability models.
//!
//! The backtester only depends on the fit/predict contract below, so any
//! algorithm that turns a training window into a probability for player 1
//! can be plugged in.

pub mod base_rate;
pub mod evaluation;
pub mod logistic;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub use base_rate::BaseRateModel;
pub use evaluation::ForecastMetrics;
pub use logistic::{LogisticRegression, LogisticRegressionConfig};

/// A model fitted on one training window.
pub trait FittedModel: Send + Sync {
    /// Probability in `[0, 1]` that player 1 wins, given an ordered feature vector.
    fn predict_probability(&self, features: &[f64]) -> f64;
}

/// A model that can be fitted on labelled feature rows.
pub trait ProbabilityModel: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Fits the model on rows of features and labels (`true` when player 1 won).
    ///
    /// # Errors
    /// Returns [`ModelError`] when the training window cannot be fitted.
    fn fit(&self, features: &[Vec<f64>], labels: &[bool])
        -> Result<Box<dyn FittedModel>, ModelError>;
}

/// Which model variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// L2-regularised logistic regression.
    #[default]
    Logistic,
    /// Training-window win frequency.
    BaseRate,
}

/// Model selection and hyper-parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Variant to build.
    #[serde(default)]
    pub kind: ModelKind,
    /// Logistic regression settings, ignored by other variants.
    #[serde(default)]
    pub logistic: LogisticRegressionConfig,
}

impl ModelConfig {
    /// Builds the configured model.
    #[must_use]
    pub fn build(&self) -> Box<dyn ProbabilityModel> {
        match self.kind {
            ModelKind::Logistic => Box::new(LogisticRegression::new(self.logistic.clone())),
            ModelKind::BaseRate => Box::new(BaseRateModel),
        }
    }
}

/// Checks that rows are rectangular, finite and aligned with labels.
///
/// Returns the number of features per row.
pub(crate) fn check_training_set(features: &[Vec<f64>], labels: &[bool]) -> Result<usize, ModelError> {
    if features.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if features.len() != labels.len() {
        return Err(ModelError::DimensionMismatch {
            expected: features.len(),
            actual: labels.len(),
        });
    }

    let width = features[0].len();
    for (row, values) in features.iter().enumerate() {
        if values.len() != width {
            return Err(ModelError::DimensionMismatch {
                expected: width,
                actual: values.len(),
            });
        }
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput { row, column });
        }
    }
    Ok(width)
}
