//! Bootstrap confidence intervals for trade-ledger statistics.
//!
//! The ledger is resampled with replacement and the statistic recomputed on
//! every resample. Interval bounds are percentiles of the resulting
//! distribution, interpolated linearly between closest ranks.
//!
//! # Example
//!
//! ```
//! use tennis_edge_backtest::bootstrap::{bootstrap_roi, BootstrapConfig};
//!
//! let config = BootstrapConfig::new(1000, 0.95).with_seed(42);
//! let result = bootstrap_roi(&[], &config);
//! assert_eq!((result.lower, result.upper), (0.0, 0.0));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tennis_edge_core::config::BacktestConfig;
use tennis_edge_core::stats::percentile_sorted;

use crate::trade::{ledger_roi, Trade};

/// Configuration for bootstrap resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples.
    pub iterations: usize,
    /// Confidence level of the interval (0.95 gives the 2.5th and 97.5th percentiles).
    pub confidence_level: f64,
    /// Seed for reproducible resamples; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            confidence_level: 0.95,
            seed: None,
        }
    }
}

impl BootstrapConfig {
    /// Creates a configuration without a seed.
    #[must_use]
    pub fn new(iterations: usize, confidence_level: f64) -> Self {
        Self {
            iterations,
            confidence_level,
            seed: None,
        }
    }

    /// Sets a seed for reproducible resamples.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

impl From<&BacktestConfig> for BootstrapConfig {
    fn from(config: &BacktestConfig) -> Self {
        Self {
            iterations: config.bootstrap_iters,
            confidence_level: config.confidence_level,
            seed: config.bootstrap_seed,
        }
    }
}

/// Point estimate and percentile interval of a statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// Statistic on the original ledger.
    pub point_estimate: f64,
    /// Lower bound of the interval.
    pub lower: f64,
    /// Upper bound of the interval.
    pub upper: f64,
    /// Standard deviation of the bootstrap distribution.
    pub standard_error: f64,
}

impl BootstrapResult {
    fn degenerate(value: f64) -> Self {
        Self {
            point_estimate: value,
            lower: value,
            upper: value,
            standard_error: 0.0,
        }
    }

    /// Width of the interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// True if zero lies outside the interval.
    #[must_use]
    pub fn excludes_zero(&self) -> bool {
        self.lower > 0.0 || self.upper < 0.0
    }
}

/// Bootstraps an arbitrary statistic of the ledger.
///
/// An empty ledger yields an all-zero result. A single-trade ledger yields a
/// zero-width interval at the point estimate.
pub fn bootstrap_statistic<F>(ledger: &[Trade], config: &BootstrapConfig, statistic: F) -> BootstrapResult
where
    F: Fn(&[&Trade]) -> f64,
{
    if ledger.is_empty() {
        return BootstrapResult::degenerate(0.0);
    }

    let original: Vec<&Trade> = ledger.iter().collect();
    let point_estimate = statistic(&original);
    if ledger.len() == 1 || config.iterations == 0 {
        return BootstrapResult::degenerate(point_estimate);
    }

    let mut rng = config.rng();
    let n = ledger.len();
    let mut sample: Vec<&Trade> = Vec::with_capacity(n);
    let mut distribution: Vec<f64> = Vec::with_capacity(config.iterations);
    for _ in 0..config.iterations {
        sample.clear();
        sample.extend((0..n).map(|_| &ledger[rng.gen_range(0..n)]));
        distribution.push(statistic(&sample));
    }

    distribution.sort_by(f64::total_cmp);

    let tail = (1.0 - config.confidence_level.clamp(0.0, 1.0)) / 2.0 * 100.0;
    let lower = percentile_sorted(&distribution, tail);
    let upper = percentile_sorted(&distribution, 100.0 - tail);

    let mean = distribution.iter().sum::<f64>() / distribution.len() as f64;
    let variance = distribution.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
        / (distribution.len() - 1).max(1) as f64;

    BootstrapResult {
        point_estimate,
        lower,
        upper,
        standard_error: variance.sqrt(),
    }
}

/// Bootstraps the ledger ROI (`sum(pnl) / sum(stake)`, zero when nothing is staked).
#[must_use]
pub fn bootstrap_roi(ledger: &[Trade], config: &BootstrapConfig) -> BootstrapResult {
    bootstrap_statistic(ledger, config, |sample| ledger_roi(sample.iter().copied()))
}

/// Bootstraps the share of winning trades.
#[must_use]
pub fn bootstrap_win_rate(ledger: &[Trade], config: &BootstrapConfig) -> BootstrapResult {
    bootstrap_statistic(ledger, config, |sample| {
        if sample.is_empty() {
            return 0.0;
        }
        sample.iter().filter(|trade| trade.won).count() as f64 / sample.len() as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::PlacedBet;
    use chrono::NaiveDate;
    use tennis_edge_core::edge::Side;

    // ============================================================
    // Test Helpers
    // ============================================================

    fn trade(won: bool, stake: f64) -> Trade {
        PlacedBet {
            match_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            side: Side::P1,
            odds: 2.0,
            model_probability: 0.55,
            stake,
            edge: 0.05,
            expected_value: 0.1 * stake,
        }
        .settle(won)
    }

    /// Ledger with a fixed 60% win rate at even odds.
    fn synthetic_ledger(n: usize) -> Vec<Trade> {
        (0..n).map(|i| trade(i % 5 < 3, 10.0)).collect()
    }

    fn seeded(iterations: usize) -> BootstrapConfig {
        BootstrapConfig::new(iterations, 0.95).with_seed(42)
    }

    // ============================================================
    // BootstrapConfig Tests
    // ============================================================

    #[test]
    fn config_default_has_expected_values() {
        let config = BootstrapConfig::default();
        assert_eq!(config.iterations, 1000);
        assert!((config.confidence_level - 0.95).abs() < f64::EPSILON);
        assert!(config.seed.is_none());
    }

    #[test]
    fn config_follows_backtest_settings() {
        let backtest = BacktestConfig::default().with_bootstrap(250, Some(9));
        let config = BootstrapConfig::from(&backtest);
        assert_eq!(config.iterations, 250);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.confidence_level, backtest.confidence_level);
    }

    #[test]
    fn config_with_seed_sets_seed() {
        assert_eq!(BootstrapConfig::default().with_seed(7).seed, Some(7));
    }

    // ============================================================
    // Degenerate Ledger Tests
    // ============================================================

    #[test]
    fn empty_ledger_returns_zeros() {
        let result = bootstrap_roi(&[], &seeded(100));
        assert_eq!(result, BootstrapResult::degenerate(0.0));
    }

    #[test]
    fn single_trade_gives_zero_width_interval() {
        let result = bootstrap_roi(&[trade(true, 10.0)], &seeded(100));
        assert_eq!(result.point_estimate, 1.0);
        assert_eq!(result.width(), 0.0);
    }

    #[test]
    fn zero_stake_ledger_has_zero_roi() {
        let ledger = vec![trade(true, 0.0), trade(false, 0.0)];
        let result = bootstrap_roi(&ledger, &seeded(200));
        assert_eq!(result.point_estimate, 0.0);
        assert_eq!(result.lower, 0.0);
        assert_eq!(result.upper, 0.0);
    }

    // ============================================================
    // ROI Interval Tests
    // ============================================================

    #[test]
    fn roi_interval_brackets_point_estimate() {
        let ledger = synthetic_ledger(100);
        let result = bootstrap_roi(&ledger, &seeded(1000));

        // 60 wins of +10, 40 losses of -10 over 1000 staked
        assert!((result.point_estimate - 0.2).abs() < 1e-12);
        assert!(result.lower < result.point_estimate);
        assert!(result.upper > result.point_estimate);
        assert!(result.lower >= -1.0 && result.upper <= 1.0);
        assert!(result.standard_error > 0.0);
    }

    #[test]
    fn interval_shrinks_with_ledger_size() {
        let small = bootstrap_roi(&synthetic_ledger(10), &seeded(1000));
        let large = bootstrap_roi(&synthetic_ledger(1000), &seeded(1000));
        assert!(
            large.width() < small.width(),
            "large={} small={}",
            large.width(),
            small.width()
        );
    }

    #[test]
    fn all_winning_ledger_has_positive_interval() {
        let ledger: Vec<Trade> = (0..20).map(|_| trade(true, 5.0)).collect();
        let result = bootstrap_roi(&ledger, &seeded(200));
        assert!(result.excludes_zero());
        assert_eq!(result.lower, 1.0);
        assert_eq!(result.upper, 1.0);
    }

    // ============================================================
    // Reproducibility Tests
    // ============================================================

    #[test]
    fn same_seed_gives_identical_results() {
        let ledger = synthetic_ledger(50);
        let a = bootstrap_roi(&ledger, &seeded(500));
        let b = bootstrap_roi(&ledger, &seeded(500));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_give_different_intervals() {
        let ledger = synthetic_ledger(50);
        let a = bootstrap_roi(&ledger, &BootstrapConfig::new(500, 0.95).with_seed(1));
        let b = bootstrap_roi(&ledger, &BootstrapConfig::new(500, 0.95).with_seed(2));
        assert_eq!(a.point_estimate, b.point_estimate);
        assert!(a.lower != b.lower || a.upper != b.upper || a.standard_error != b.standard_error);
    }

    // ============================================================
    // Win Rate Tests
    // ============================================================

    #[test]
    fn win_rate_interval_contains_true_rate() {
        let result = bootstrap_win_rate(&synthetic_ledger(200), &seeded(1000));
        assert!((result.point_estimate - 0.6).abs() < 1e-12);
        assert!(result.lower < 0.6 && result.upper > 0.6);
        assert!(result.lower > 0.45 && result.upper < 0.75);
    }

    #[test]
    fn narrower_confidence_level_gives_narrower_interval() {
        let ledger = synthetic_ledger(100);
        let wide = bootstrap_roi(&ledger, &BootstrapConfig::new(1000, 0.95).with_seed(3));
        let narrow = bootstrap_roi(&ledger, &BootstrapConfig::new(1000, 0.80).with_seed(3));
        assert!(narrow.width() < wide.width());
    }
}
