//! Walk-forward backtesting of tennis win-probability models against
//! bookmaker odds, with bootstrap confidence intervals on ROI.

pub mod bootstrap;
pub mod data_provider;
pub mod holdout;
pub mod record;
pub mod summary;
pub mod trade;
pub mod walk_forward;

pub use bootstrap::{bootstrap_roi, bootstrap_statistic, bootstrap_win_rate, BootstrapConfig, BootstrapResult};
pub use data_provider::{load_matches_csv, read_matches};
pub use holdout::{evaluate_holdout, evaluate_holdout_with_model, HoldoutReport, DEFAULT_TEST_FRACTION};
pub use record::{FeatureSchema, MatchRecord};
pub use summary::{BacktestSummary, SkipCounts};
pub use trade::{ledger_roi, PlacedBet, Trade};
pub use walk_forward::{run_backtest, run_backtest_with_model, BacktestReport, Prediction};
