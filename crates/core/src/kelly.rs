//! Kelly Criterion sizing for decimal-odds bets.
//!
//! Provides the full Kelly fraction, a capped fractional-Kelly stake and the
//! expected value of a stake. All functions are total: degenerate inputs
//! produce a zero stake rather than an error.

use serde::{Deserialize, Serialize};

/// Full Kelly fraction for a bet at decimal odds.
///
/// With net odds `b = decimal_odds - 1`:
/// ```text
/// f* = (p(b+1) - 1) / b
/// ```
/// clamped to `[0, 1]`. Returns `0` when `b <= 0` or the inputs are not finite.
///
/// # Examples
/// ```
/// use tennis_edge_core::kelly::kelly_fraction;
///
/// // 60% at 2.10: (0.6 * 2.1 - 1) / 1.1
/// let f = kelly_fraction(0.6, 2.1);
/// assert!((f - 0.236_363_636).abs() < 1e-6);
///
/// // No edge below the break-even probability
/// assert_eq!(kelly_fraction(0.4, 2.0), 0.0);
/// ```
#[must_use]
pub fn kelly_fraction(model_prob: f64, decimal_odds: f64) -> f64 {
    if !model_prob.is_finite() || !decimal_odds.is_finite() {
        return 0.0;
    }
    let b = decimal_odds - 1.0;
    if b <= 0.0 {
        return 0.0;
    }
    ((model_prob * (b + 1.0) - 1.0) / b).clamp(0.0, 1.0)
}

/// Expected profit of staking `stake` at decimal odds.
///
/// `EV = p * b * stake - (1 - p) * stake` where `b = decimal_odds - 1`.
#[must_use]
pub fn expected_value(model_prob: f64, decimal_odds: f64, stake: f64) -> f64 {
    let b = decimal_odds - 1.0;
    model_prob * b * stake - (1.0 - model_prob) * stake
}

/// Fractional-Kelly sizer with a hard per-bet cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellySizer {
    /// Fraction of full Kelly to stake (0.25 = quarter Kelly).
    pub kelly_multiplier: f64,
    /// Maximum stake as a fraction of the bankroll.
    pub max_stake_fraction: f64,
    /// Reference capital stakes are sized against.
    pub bankroll: f64,
}

impl Default for KellySizer {
    fn default() -> Self {
        Self {
            kelly_multiplier: 0.25,
            max_stake_fraction: 0.05,
            bankroll: 1000.0,
        }
    }
}

/// Result of sizing a single bet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeDecision {
    /// Full Kelly fraction before scaling and capping.
    pub full_kelly_fraction: f64,
    /// Fraction of bankroll actually staked.
    pub applied_fraction: f64,
    /// Stake amount.
    pub stake: f64,
    /// Expected profit of the stake.
    pub expected_value: f64,
}

impl KellySizer {
    /// Creates a sizer with custom parameters.
    #[must_use]
    pub fn new(kelly_multiplier: f64, max_stake_fraction: f64, bankroll: f64) -> Self {
        Self {
            kelly_multiplier,
            max_stake_fraction,
            bankroll,
        }
    }

    /// Fraction of the bankroll to stake: `min(f* * multiplier, cap)`, never negative.
    #[must_use]
    pub fn applied_fraction(&self, model_prob: f64, decimal_odds: f64) -> f64 {
        let scaled = kelly_fraction(model_prob, decimal_odds) * self.kelly_multiplier;
        let fraction = scaled.min(self.max_stake_fraction).max(0.0);
        if fraction.is_finite() {
            fraction
        } else {
            0.0
        }
    }

    /// Stake amount for a bet.
    ///
    /// Always within `[0, max_stake_fraction * bankroll]`; zero when the
    /// bankroll is not a positive finite number.
    #[must_use]
    pub fn stake(&self, model_prob: f64, decimal_odds: f64) -> f64 {
        if !self.bankroll.is_finite() || self.bankroll <= 0.0 {
            return 0.0;
        }
        self.applied_fraction(model_prob, decimal_odds) * self.bankroll
    }

    /// Sizes a bet and reports the intermediate fractions and expected value.
    #[must_use]
    pub fn size(&self, model_prob: f64, decimal_odds: f64) -> StakeDecision {
        let stake = self.stake(model_prob, decimal_odds);
        StakeDecision {
            full_kelly_fraction: kelly_fraction(model_prob, decimal_odds),
            applied_fraction: self.applied_fraction(model_prob, decimal_odds),
            stake,
            expected_value: expected_value(model_prob, decimal_odds, stake),
        }
    }
}

/// Stake for a bet under the given sizing parameters.
#[must_use]
pub fn stake_size(model_prob: f64, decimal_odds: f64, sizer: &KellySizer) -> f64 {
    sizer.stake(model_prob, decimal_odds)
}
