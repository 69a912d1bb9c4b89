//! Single time-ordered train/test evaluation of the probability model.

use serde::{Deserialize, Serialize};
use tennis_edge_core::config::BacktestConfig;
use tennis_edge_core::error::{EdgeError, Result};
use tennis_edge_core::model::{ForecastMetrics, ProbabilityModel};
use tracing::info;

use crate::record::{FeatureSchema, MatchRecord};

/// Default share of labelled records held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.25;

/// Forecast quality of a model on the most recent records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutReport {
    /// Model evaluated.
    pub model: String,
    /// Labelled records used for fitting.
    pub train_size: usize,
    /// Labelled records scored.
    pub test_size: usize,
    /// Records dropped for missing features or label.
    pub skipped: usize,
    /// Metrics on the test records.
    pub metrics: ForecastMetrics,
}

/// Fits the configured model on the earliest records and scores the latest
/// `test_fraction` of them.
///
/// # Errors
///
/// See [`evaluate_holdout_with_model`].
pub fn evaluate_holdout(
    matches: &[MatchRecord],
    config: &BacktestConfig,
    test_fraction: f64,
) -> Result<HoldoutReport> {
    let model = config.model.build();
    evaluate_holdout_with_model(matches, config, test_fraction, model.as_ref())
}

/// Holdout evaluation with an injected model.
///
/// Records are split in their given order, never shuffled. The test set
/// size is `ceil(n * test_fraction)` of the `n` usable records.
///
/// # Errors
///
/// Returns [`EdgeError::InvalidConfig`] for a bad configuration or a test
/// fraction outside `(0, 1)`, [`EdgeError::Dataset`] when either side of the
/// split would be empty, and [`EdgeError::ModelFitting`] when the model
/// cannot be fitted.
pub fn evaluate_holdout_with_model(
    matches: &[MatchRecord],
    config: &BacktestConfig,
    test_fraction: f64,
    model: &dyn ProbabilityModel,
) -> Result<HoldoutReport> {
    config.validate()?;
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(EdgeError::InvalidConfig(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let schema = FeatureSchema::new(config.features.iter().cloned());
    let usable: Vec<(&MatchRecord, Vec<f64>, bool)> = matches
        .iter()
        .filter_map(|record| {
            let row = schema.extract(record, config.missing_feature_fill)?;
            Some((record, row, record.label?))
        })
        .collect();

    let n = usable.len();
    let test_size = ((n as f64) * test_fraction).ceil() as usize;
    let train_size = n.saturating_sub(test_size);
    if train_size == 0 || test_size == 0 {
        return Err(EdgeError::Dataset(format!(
            "{n} labelled records cannot be split with test_fraction {test_fraction}"
        )));
    }

    let (train, test) = usable.split_at(train_size);
    let features: Vec<Vec<f64>> = train.iter().map(|(_, row, _)| row.clone()).collect();
    let labels: Vec<bool> = train.iter().map(|(_, _, label)| *label).collect();

    let fitted = model
        .fit(&features, &labels)
        .map_err(|source| EdgeError::ModelFitting {
            step: train_size,
            match_id: test[0].0.match_id,
            source,
        })?;

    let predictions: Vec<(f64, bool)> = test
        .iter()
        .map(|(_, row, label)| (fitted.predict_probability(row), *label))
        .collect();
    let metrics = ForecastMetrics::from_predictions(&predictions);

    info!(
        model = model.name(),
        train_size,
        test_size,
        brier = metrics.brier,
        accuracy = metrics.accuracy,
        "holdout evaluation complete"
    );

    Ok(HoldoutReport {
        model: model.name().to_string(),
        train_size,
        test_size,
        skipped: matches.len() - n,
        metrics,
    })
}
