//! L2-regularised logistic regression fitted by batch gradient descent.
//!
//! Features are standardised with the training window's mean and standard
//! deviation before fitting. Weights start at zero and rows are visited in
//! order, so a given window always yields the same model.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_training_set, FittedModel, ProbabilityModel};
use crate::error::ModelError;

/// Hyper-parameters for [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Inverse regularisation strength (larger = weaker penalty).
    pub inverse_regularization: f64,
    /// Maximum gradient-descent iterations.
    pub max_iter: usize,
    /// Upper bound on the step size on the standardised problem.
    pub learning_rate: f64,
    /// Stop once every gradient component is below this value.
    pub tolerance: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            inverse_regularization: 1.0,
            max_iter: 200,
            learning_rate: 0.5,
            tolerance: 1e-8,
        }
    }
}

/// Logistic regression probability model.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
}

impl LogisticRegression {
    /// Creates a model with the given hyper-parameters.
    #[must_use]
    pub fn new(config: LogisticRegressionConfig) -> Self {
        Self { config }
    }

    /// Returns the hyper-parameters.
    #[must_use]
    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }
}

/// Coefficients of a fitted logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLogistic {
    /// Intercept on the standardised scale.
    pub intercept: f64,
    /// Weights on the standardised scale.
    pub weights: Vec<f64>,
    /// Training means per feature.
    pub means: Vec<f64>,
    /// Training standard deviations per feature (1.0 for constant columns).
    pub scales: Vec<f64>,
    /// Iterations actually run.
    pub iterations: usize,
}

impl FittedLogistic {
    fn logit(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .zip(self.means.iter().zip(&self.scales))
            .map(|((w, x), (mean, scale))| w * (x - mean) / scale)
            .sum::<f64>()
            + self.intercept
    }
}

impl FittedModel for FittedLogistic {
    fn predict_probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.logit(features))
    }
}

impl ProbabilityModel for LogisticRegression {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[bool],
    ) -> Result<Box<dyn FittedModel>, ModelError> {
        Ok(Box::new(self.fit_coefficients(features, labels)?))
    }
}

impl LogisticRegression {
    /// Fits and returns the concrete coefficients.
    ///
    /// # Errors
    /// Fails on empty, ragged or non-finite input, and when all labels are equal.
    pub fn fit_coefficients(
        &self,
        features: &[Vec<f64>],
        labels: &[bool],
    ) -> Result<FittedLogistic, ModelError> {
        let width = check_training_set(features, labels)?;
        let positives = labels.iter().filter(|&&y| y).count();
        if positives == 0 || positives == labels.len() {
            return Err(ModelError::SingleClass {
                n_samples: labels.len(),
            });
        }

        let n = features.len() as f64;
        let (means, scales) = standardisation(features, width);
        let rows: Vec<Vec<f64>> = features
            .iter()
            .map(|row| {
                row.iter()
                    .zip(means.iter().zip(&scales))
                    .map(|(x, (mean, scale))| (x - mean) / scale)
                    .collect()
            })
            .collect();
        let targets: Vec<f64> = labels.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();

        let penalty = 1.0 / (self.config.inverse_regularization.max(f64::MIN_POSITIVE) * n);
        // Standardised columns bound the curvature, keeping the step inside 1/L
        let lipschitz = 0.25 * (1.0 + width as f64) + penalty;
        let step = self.config.learning_rate.min(1.0 / lipschitz);
        let mut weights = vec![0.0; width];
        let mut intercept = 0.0;
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..self.config.max_iter {
            iterations += 1;
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;

            for (row, y) in rows.iter().zip(&targets) {
                let z = intercept + row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>();
                let residual = sigmoid(z) - y;
                grad_b += residual;
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += residual * x;
                }
            }

            grad_b /= n;
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g = *g / n + penalty * w;
            }

            intercept -= step * grad_b;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= step * g;
            }

            let max_grad = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            debug!(
                iterations,
                n_samples = features.len(),
                "logistic regression reached max_iter before tolerance"
            );
        }

        Ok(FittedLogistic {
            intercept,
            weights,
            means,
            scales,
            iterations,
        })
    }
}

fn standardisation(features: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = features.len() as f64;
    let mut means = vec![0.0; width];
    for row in features {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x / n;
        }
    }

    let mut scales = vec![0.0; width];
    for row in features {
        for ((s, x), m) in scales.iter_mut().zip(row).zip(&means) {
            *s += (x - m).powi(2) / n;
        }
    }
    for s in &mut scales {
        *s = s.sqrt();
        if *s < 1e-12 {
            *s = 1.0;
        }
    }
    (means, scales)
}

/// Numerically stable logistic function.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_rows() -> (Vec<Vec<f64>>, Vec<bool>) {
        let features = vec![
            vec![-3.0, 0.1],
            vec![-2.0, 0.4],
            vec![-1.0, 0.2],
            vec![1.0, 0.3],
            vec![2.0, 0.5],
            vec![3.0, 0.2],
        ];
        let labels = vec![false, false, false, true, true, true];
        (features, labels)
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
        assert!(sigmoid(-1000.0).is_finite());
        assert!(sigmoid(1000.0) <= 1.0);
    }

    #[test]
    fn learns_direction_of_informative_feature() {
        let (features, labels) = separable_rows();
        let model = LogisticRegression::default().fit(&features, &labels).unwrap();

        let low = model.predict_probability(&[-2.5, 0.3]);
        let high = model.predict_probability(&[2.5, 0.3]);
        assert!(low < 0.5, "low={low}");
        assert!(high > 0.5, "high={high}");
    }

    #[test]
    fn predictions_stay_in_unit_interval() {
        let (features, labels) = separable_rows();
        let model = LogisticRegression::default().fit(&features, &labels).unwrap();
        for x in [-1e6, -10.0, 0.0, 10.0, 1e6] {
            let p = model.predict_probability(&[x, 0.0]);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn fitting_is_deterministic() {
        let (features, labels) = separable_rows();
        let lr = LogisticRegression::default();
        let a = lr.fit_coefficients(&features, &labels).unwrap();
        let b = lr.fit_coefficients(&features, &labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stronger_regularisation_shrinks_weights() {
        let (features, labels) = separable_rows();
        let weak = LogisticRegression::new(LogisticRegressionConfig {
            inverse_regularization: 10.0,
            ..LogisticRegressionConfig::default()
        })
        .fit_coefficients(&features, &labels)
        .unwrap();
        let strong = LogisticRegression::new(LogisticRegressionConfig {
            inverse_regularization: 0.01,
            ..LogisticRegressionConfig::default()
        })
        .fit_coefficients(&features, &labels)
        .unwrap();
        assert!(strong.weights[0].abs() < weak.weights[0].abs());
    }

    #[test]
    fn balanced_uninformative_data_predicts_near_half() {
        let features = vec![vec![1.0], vec![1.0], vec![1.0], vec![1.0]];
        let labels = vec![true, false, true, false];
        let model = LogisticRegression::default().fit(&features, &labels).unwrap();
        assert!((model.predict_probability(&[1.0]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_single_class_window() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![true, true, true];
        let err = LogisticRegression::default()
            .fit(&features, &labels)
            .err()
            .unwrap();
        assert_eq!(err, ModelError::SingleClass { n_samples: 3 });
    }

    #[test]
    fn rejects_non_finite_features() {
        let features = vec![vec![1.0], vec![f64::INFINITY]];
        let labels = vec![true, false];
        assert!(matches!(
            LogisticRegression::default().fit(&features, &labels),
            Err(ModelError::NonFiniteInput { row: 1, column: 0 })
        ));
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let features = vec![vec![5.0, -1.0], vec![5.0, 1.0], vec![5.0, -2.0], vec![5.0, 2.0]];
        let labels = vec![false, true, false, true];
        let fitted = LogisticRegression::default()
            .fit_coefficients(&features, &labels)
            .unwrap();
        assert_eq!(fitted.scales[0], 1.0);
        assert!(fitted.weights.iter().all(|w| w.is_finite()));
    }
}
