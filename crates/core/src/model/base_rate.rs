//! Baseline model predicting the training-window win frequency.

use super::{check_training_set, FittedModel, ProbabilityModel};
use crate::error::ModelError;

/// Predicts how often player 1 won in the training window, ignoring features.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseRateModel;

/// A fitted base rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedBaseRate {
    /// Share of training rows where player 1 won.
    pub rate: f64,
}

impl FittedModel for FittedBaseRate {
    fn predict_probability(&self, _features: &[f64]) -> f64 {
        self.rate
    }
}

impl ProbabilityModel for BaseRateModel {
    fn name(&self) -> &str {
        "base_rate"
    }

    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[bool],
    ) -> Result<Box<dyn FittedModel>, ModelError> {
        check_training_set(features, labels)?;
        let wins = labels.iter().filter(|&&y| y).count();
        Ok(Box::new(FittedBaseRate {
            rate: wins as f64 / labels.len() as f64,
        }))
    }
}
