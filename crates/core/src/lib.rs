//! Betting-decision core for two-outcome tennis markets.
//!
//! Converts bookmaker decimal odds into margin-free probabilities, compares
//! them with a model's win probability, picks a side when the edge is large
//! enough and sizes the stake with capped fractional Kelly. The trainable
//! probability models used by the walk-forward backtester also live here.

pub mod config;
pub mod config_loader;
pub mod decision;
pub mod edge;
pub mod error;
pub mod kelly;
pub mod model;
pub mod odds;
pub mod stats;

pub use config::{BacktestConfig, FitFailurePolicy};
pub use config_loader::ConfigLoader;
pub use decision::{classify_and_size, BetDecision, BetReason};
pub use edge::{EdgeAssessment, EdgeClassifier, Selection, Side, DEFAULT_EDGE_MIN};
pub use error::{EdgeError, ModelError, Result};
pub use kelly::{expected_value, kelly_fraction, stake_size, KellySizer, StakeDecision};
pub use model::{
    BaseRateModel, FittedModel, ForecastMetrics, LogisticRegression, LogisticRegressionConfig,
    ModelConfig, ModelKind, ProbabilityModel,
};
pub use odds::{fair_odds, implied_probability, remove_vig_two_outcome, MarketOdds, MarketProbabilities};
pub use stats::wilson_ci;
