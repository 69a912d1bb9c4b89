//! Aggregate statistics over a trade ledger.

use serde::{Deserialize, Serialize};
use tennis_edge_core::model::ForecastMetrics;
use tennis_edge_core::stats::{wilson_ci, Z_95};

use crate::bootstrap::{bootstrap_roi, BootstrapConfig, BootstrapResult};
use crate::trade::{ledger_roi, Trade};

/// Walk-forward steps that produced no trade, by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    /// Record lacked a feature in the schema.
    pub missing_features: usize,
    /// Record had no result.
    pub missing_label: usize,
    /// Odds absent, zero or negative.
    pub invalid_odds: usize,
    /// No usable record preceded the step, so there was nothing to fit.
    #[serde(default)]
    pub empty_window: usize,
    /// Training window could not be fitted (skip policy only).
    pub fit_failures: usize,
    /// Classifier abstained.
    pub passes: usize,
}

impl SkipCounts {
    /// Total skipped steps.
    #[must_use]
    pub fn total(&self) -> usize {
        self.missing_features
            + self.missing_label
            + self.invalid_odds
            + self.empty_window
            + self.fit_failures
            + self.passes
    }
}

/// Summary of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Number of trades in the ledger.
    pub trades: usize,
    /// Sum of stakes.
    pub total_staked: f64,
    /// Sum of realised profit and loss.
    pub profit: f64,
    /// `profit / total_staked`, zero when nothing was staked.
    pub roi: f64,
    /// Bootstrap interval on ROI as `(lower, upper)`.
    pub roi_ci: (f64, f64),
    /// Bootstrap standard error of ROI.
    pub roi_standard_error: f64,
    /// True if the ROI interval lies entirely above or below zero.
    #[serde(default)]
    pub roi_excludes_zero: bool,
    /// Trades whose side won.
    pub wins: usize,
    /// `wins / trades`.
    pub win_rate: f64,
    /// Wilson 95% interval on the win rate.
    pub win_rate_ci: (f64, f64),
    /// Sum of decision-time expected values.
    pub expected_value: f64,
    /// Largest peak-to-trough fall of cumulative profit.
    pub max_drawdown: f64,
    /// Steps past warmup that were considered.
    pub steps_evaluated: usize,
    /// Steps that produced no trade.
    pub skipped: SkipCounts,
    /// Quality of the out-of-sample probability forecasts.
    pub forecast: ForecastMetrics,
}

impl BacktestSummary {
    /// Summary of a run without trades or evaluated steps.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            trades: 0,
            total_staked: 0.0,
            profit: 0.0,
            roi: 0.0,
            roi_ci: (0.0, 0.0),
            roi_standard_error: 0.0,
            roi_excludes_zero: false,
            wins: 0,
            win_rate: 0.0,
            win_rate_ci: (0.0, 0.0),
            expected_value: 0.0,
            max_drawdown: 0.0,
            steps_evaluated: 0,
            skipped: SkipCounts::default(),
            forecast: ForecastMetrics::empty(),
        }
    }

    /// Summarises a ledger, bootstrapping the ROI interval.
    #[must_use]
    pub fn from_ledger(ledger: &[Trade], bootstrap: &BootstrapConfig) -> Self {
        if ledger.is_empty() {
            return Self::empty();
        }

        let total_staked: f64 = ledger.iter().map(|t| t.stake).sum();
        let profit: f64 = ledger.iter().map(|t| t.pnl).sum();
        let wins = ledger.iter().filter(|t| t.won).count();
        let roi_interval: BootstrapResult = bootstrap_roi(ledger, bootstrap);

        Self {
            trades: ledger.len(),
            total_staked,
            profit,
            roi: ledger_roi(ledger),
            roi_ci: (roi_interval.lower, roi_interval.upper),
            roi_standard_error: roi_interval.standard_error,
            roi_excludes_zero: roi_interval.excludes_zero(),
            wins,
            win_rate: wins as f64 / ledger.len() as f64,
            win_rate_ci: wilson_ci(wins, ledger.len(), Z_95),
            expected_value: ledger.iter().map(|t| t.expected_value).sum(),
            max_drawdown: max_drawdown(ledger),
            ..Self::empty()
        }
    }

    /// Attaches step accounting and forecast metrics.
    #[must_use]
    pub fn with_run_details(
        mut self,
        steps_evaluated: usize,
        skipped: SkipCounts,
        forecast: ForecastMetrics,
    ) -> Self {
        self.steps_evaluated = steps_evaluated;
        self.skipped = skipped;
        self.forecast = forecast;
        self
    }
}

/// Largest drop of cumulative profit from a running peak, starting from zero.
#[must_use]
pub fn max_drawdown(ledger: &[Trade]) -> f64 {
    let mut peak = 0.0_f64;
    let mut equity = 0.0;
    let mut max_dd = 0.0_f64;

    for trade in ledger {
        equity += trade.pnl;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::PlacedBet;
    use chrono::NaiveDate;
    use tennis_edge_core::edge::Side;

    fn trade(won: bool, stake: f64, odds: f64) -> Trade {
        PlacedBet {
            match_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            side: Side::P1,
            odds,
            model_probability: 0.6,
            stake,
            edge: 0.05,
            expected_value: 1.0,
        }
        .settle(won)
    }

    #[test]
    fn empty_ledger_gives_zeroed_summary() {
        let summary = BacktestSummary::from_ledger(&[], &BootstrapConfig::default());
        assert_eq!(summary, BacktestSummary::empty());
        assert_eq!(summary.trades, 0);
        assert_eq!(summary.roi, 0.0);
    }

    #[test]
    fn totals_and_roi() {
        let ledger = vec![trade(true, 20.0, 2.1), trade(false, 10.0, 2.0), trade(true, 10.0, 1.5)];
        let summary =
            BacktestSummary::from_ledger(&ledger, &BootstrapConfig::new(200, 0.95).with_seed(1));

        assert_eq!(summary.trades, 3);
        assert!((summary.total_staked - 40.0).abs() < 1e-9);
        // 22 - 10 + 5
        assert!((summary.profit - 17.0).abs() < 1e-9);
        assert!((summary.roi - 17.0 / 40.0).abs() < 1e-9);
        assert_eq!(summary.wins, 2);
        assert!((summary.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.expected_value - 3.0).abs() < 1e-12);
        assert!(summary.roi_ci.0 <= summary.roi_ci.1);
        assert!(summary.win_rate_ci.0 < summary.win_rate && summary.win_rate < summary.win_rate_ci.1);
    }

    #[test]
    fn consistent_winners_give_interval_excluding_zero() {
        let ledger: Vec<Trade> = (0..10).map(|_| trade(true, 10.0, 1.8)).collect();
        let summary =
            BacktestSummary::from_ledger(&ledger, &BootstrapConfig::new(200, 0.95).with_seed(3));

        assert!(summary.roi_excludes_zero);
        assert!(!BacktestSummary::empty().roi_excludes_zero);
    }

    #[test]
    fn max_drawdown_tracks_peak_to_trough() {
        let ledger = vec![
            trade(true, 10.0, 2.0),  // +10
            trade(false, 5.0, 2.0),  // +5
            trade(false, 15.0, 2.0), // -10
            trade(true, 30.0, 2.0),  // +20
        ];
        assert!((max_drawdown(&ledger) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_counts_losses_from_start() {
        let ledger = vec![trade(false, 10.0, 2.0)];
        assert_eq!(max_drawdown(&ledger), 10.0);
    }

    #[test]
    fn skip_counts_total() {
        let skipped = SkipCounts {
            missing_features: 1,
            missing_label: 2,
            invalid_odds: 3,
            empty_window: 6,
            fit_failures: 4,
            passes: 5,
        };
        assert_eq!(skipped.total(), 21);
    }
}
