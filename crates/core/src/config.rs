use serde::{Deserialize, Serialize};

use crate::edge::{EdgeClassifier, DEFAULT_EDGE_MIN};
use crate::error::{EdgeError, Result};
use crate::kelly::KellySizer;
use crate::model::ModelConfig;

/// What the backtester does when the model fails to fit a training window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitFailurePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Log the failure, count it and move on to the next match.
    Skip,
}

/// Configuration for a walk-forward backtest and for single decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Feature names, in the order the model sees them.
    pub features: Vec<String>,
    /// Matches before the first evaluated one.
    pub min_train_size: usize,
    /// Minimum edge over the fair market probability.
    pub edge_min: f64,
    /// Fraction of full Kelly to stake.
    pub kelly_multiplier: f64,
    /// Per-trade stake cap as a fraction of bankroll.
    pub max_stake_fraction: f64,
    /// Reference bankroll each trade is sized against.
    pub bankroll: f64,
    /// Bootstrap resamples for the ROI interval.
    pub bootstrap_iters: usize,
    /// Seed for the bootstrap; entropy when absent.
    pub bootstrap_seed: Option<u64>,
    /// Confidence level of the ROI interval.
    pub confidence_level: f64,
    /// Behaviour when a training window cannot be fitted.
    pub fit_failure_policy: FitFailurePolicy,
    /// Value substituted for missing features; rows are skipped when absent.
    pub missing_feature_fill: Option<f64>,
    /// Probability model settings.
    pub model: ModelConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            features: vec![
                "elo_diff".to_string(),
                "h2h_p1".to_string(),
                "form_p1".to_string(),
                "form_p2".to_string(),
            ],
            min_train_size: 6,
            edge_min: DEFAULT_EDGE_MIN,
            kelly_multiplier: 0.25,
            max_stake_fraction: 0.05,
            bankroll: 1000.0,
            bootstrap_iters: 1000,
            bootstrap_seed: None,
            confidence_level: 0.95,
            fit_failure_policy: FitFailurePolicy::Abort,
            missing_feature_fill: None,
            model: ModelConfig::default(),
        }
    }
}

impl BacktestConfig {
    /// Sets the feature schema.
    #[must_use]
    pub fn with_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the minimum training size.
    #[must_use]
    pub fn with_min_train_size(mut self, min_train_size: usize) -> Self {
        self.min_train_size = min_train_size;
        self
    }

    /// Sets the minimum edge.
    #[must_use]
    pub fn with_edge_min(mut self, edge_min: f64) -> Self {
        self.edge_min = edge_min;
        self
    }

    /// Sets Kelly multiplier, stake cap and bankroll.
    #[must_use]
    pub fn with_sizing(mut self, kelly_multiplier: f64, max_stake_fraction: f64, bankroll: f64) -> Self {
        self.kelly_multiplier = kelly_multiplier;
        self.max_stake_fraction = max_stake_fraction;
        self.bankroll = bankroll;
        self
    }

    /// Sets the bootstrap iteration count and seed.
    #[must_use]
    pub fn with_bootstrap(mut self, iterations: usize, seed: Option<u64>) -> Self {
        self.bootstrap_iters = iterations;
        self.bootstrap_seed = seed;
        self
    }

    /// Sets the fit-failure policy.
    #[must_use]
    pub fn with_fit_failure_policy(mut self, policy: FitFailurePolicy) -> Self {
        self.fit_failure_policy = policy;
        self
    }

    /// Sets the missing-feature fill value.
    #[must_use]
    pub fn with_missing_feature_fill(mut self, fill: Option<f64>) -> Self {
        self.missing_feature_fill = fill;
        self
    }

    /// Sets the model configuration.
    #[must_use]
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Sizing parameters derived from this configuration.
    #[must_use]
    pub fn sizer(&self) -> KellySizer {
        KellySizer::new(self.kelly_multiplier, self.max_stake_fraction, self.bankroll)
    }

    /// Edge classifier derived from this configuration.
    #[must_use]
    pub fn classifier(&self) -> EdgeClassifier {
        EdgeClassifier::new(self.edge_min)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    /// Returns [`EdgeError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(invalid("at least one feature is required"));
        }
        if let Some(dup) = first_duplicate(&self.features) {
            return Err(invalid(format!("feature '{dup}' is listed twice")));
        }
        if self.min_train_size == 0 {
            return Err(invalid("min_train_size must be at least 1"));
        }
        if !self.edge_min.is_finite() {
            return Err(invalid("edge_min must be finite"));
        }
        if !(self.kelly_multiplier > 0.0 && self.kelly_multiplier <= 1.0) {
            return Err(invalid(format!(
                "kelly_multiplier must be in (0, 1], got {}",
                self.kelly_multiplier
            )));
        }
        if !(self.max_stake_fraction > 0.0 && self.max_stake_fraction <= 1.0) {
            return Err(invalid(format!(
                "max_stake_fraction must be in (0, 1], got {}",
                self.max_stake_fraction
            )));
        }
        if !(self.bankroll.is_finite() && self.bankroll > 0.0) {
            return Err(invalid(format!(
                "bankroll must be positive, got {}",
                self.bankroll
            )));
        }
        if self.bootstrap_iters == 0 {
            return Err(invalid("bootstrap_iters must be at least 1"));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(invalid(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if let Some(fill) = self.missing_feature_fill {
            if !fill.is_finite() {
                return Err(invalid("missing_feature_fill must be finite"));
            }
        }
        let logistic = &self.model.logistic;
        if !(logistic.inverse_regularization > 0.0 && logistic.learning_rate > 0.0) {
            return Err(invalid(
                "logistic inverse_regularization and learning_rate must be positive",
            ));
        }
        if logistic.max_iter == 0 {
            return Err(invalid("logistic max_iter must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> EdgeError {
    EdgeError::InvalidConfig(message.into())
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(*name))
        .map(|(_, name)| name.as_str())
}
