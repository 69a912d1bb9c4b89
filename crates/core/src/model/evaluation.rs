//! Forecast-quality metrics for probability predictions.
//!
//! Brier score and log loss measure calibration, accuracy counts correct
//! calls at the 0.5 threshold, and ROC AUC measures ranking quality.

use serde::{Deserialize, Serialize};

/// Probabilities are clipped to this distance from 0 and 1 for log loss.
const LOG_LOSS_EPS: f64 = 1e-15;

/// Quality metrics for a set of probability forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Number of forecasts scored.
    pub n: usize,
    /// Mean squared error between probability and outcome.
    pub brier: f64,
    /// Mean negative log-likelihood.
    pub log_loss: f64,
    /// Share of forecasts on the correct side of 0.5.
    pub accuracy: f64,
    /// Area under the ROC curve, `None` when only one class is present.
    pub roc_auc: Option<f64>,
}

impl ForecastMetrics {
    /// Metrics for an empty forecast set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            n: 0,
            brier: 0.0,
            log_loss: 0.0,
            accuracy: 0.0,
            roc_auc: None,
        }
    }

    /// Scores `(probability, outcome)` pairs, where the outcome is `true` when player 1 won.
    #[must_use]
    pub fn from_predictions(predictions: &[(f64, bool)]) -> Self {
        if predictions.is_empty() {
            return Self::empty();
        }

        let n = predictions.len() as f64;
        let mut brier = 0.0;
        let mut log_loss = 0.0;
        let mut correct = 0usize;

        for &(p, y) in predictions {
            let target = if y { 1.0 } else { 0.0 };
            brier += (p - target).powi(2);

            let clipped = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            log_loss -= if y { clipped.ln() } else { (1.0 - clipped).ln() };

            if (p > 0.5) == y {
                correct += 1;
            }
        }

        Self {
            n: predictions.len(),
            brier: brier / n,
            log_loss: log_loss / n,
            accuracy: correct as f64 / n,
            roc_auc: roc_auc(predictions),
        }
    }
}

/// Rank-based ROC AUC with average ranks for tied scores.
///
/// Returns `None` unless both classes are present.
#[must_use]
pub fn roc_auc(predictions: &[(f64, bool)]) -> Option<f64> {
    let positives = predictions.iter().filter(|(_, y)| *y).count();
    let negatives = predictions.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut sorted: Vec<(f64, bool)> = predictions.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1].0 == sorted[i].0 {
            j += 1;
        }
        // Ranks are 1-based; ties share the mean of their positions
        let average_rank = (i + j) as f64 / 2.0 + 1.0;
        positive_rank_sum += average_rank * sorted[i..=j].iter().filter(|(_, y)| *y).count() as f64;
        i = j + 1;
    }

    let pos = positives as f64;
    let neg = negatives as f64;
    Some((positive_rank_sum - pos * (pos + 1.0) / 2.0) / (pos * neg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_predictions_give_empty_metrics() {
        let metrics = ForecastMetrics::from_predictions(&[]);
        assert_eq!(metrics, ForecastMetrics::empty());
    }

    #[test]
    fn perfect_forecasts() {
        let preds = [(1.0, true), (0.0, false), (1.0, true)];
        let metrics = ForecastMetrics::from_predictions(&preds);

        assert_eq!(metrics.n, 3);
        assert_eq!(metrics.brier, 0.0);
        assert!(metrics.log_loss < 1e-12);
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.roc_auc, Some(1.0));
    }

    #[test]
    fn coin_flip_forecasts() {
        let preds = [(0.5, true), (0.5, false), (0.5, true), (0.5, false)];
        let metrics = ForecastMetrics::from_predictions(&preds);

        assert!((metrics.brier - 0.25).abs() < 1e-12);
        assert!((metrics.log_loss - std::f64::consts::LN_2).abs() < 1e-12);
        assert_eq!(metrics.roc_auc, Some(0.5));
    }

    #[test]
    fn confident_wrong_forecast_has_finite_log_loss() {
        let metrics = ForecastMetrics::from_predictions(&[(0.0, true)]);
        assert!(metrics.log_loss.is_finite());
        assert!(metrics.log_loss > 30.0);
        assert_eq!(metrics.accuracy, 0.0);
    }

    #[test]
    fn auc_undefined_for_single_class() {
        assert_eq!(roc_auc(&[(0.2, true), (0.9, true)]), None);
        assert_eq!(roc_auc(&[(0.2, false)]), None);
    }

    #[test]
    fn auc_counts_ordered_pairs() {
        // Pairs (pos, neg): (0.8,0.3) ok, (0.8,0.6) ok, (0.4,0.3) ok, (0.4,0.6) wrong
        let preds = [(0.8, true), (0.4, true), (0.3, false), (0.6, false)];
        assert!((roc_auc(&preds).unwrap() - 0.75).abs() < 1e-12);
    }
}
