//! Decimal odds and probability conversion for two-outcome markets.
//!
//! Bookmaker prices are quoted as decimal odds (payout per unit staked).
//! Their reciprocals are implied probabilities, which sum to more than one
//! because of the bookmaker margin. Proportional normalisation removes the
//! margin while keeping the ratio between the two sides.

use serde::{Deserialize, Serialize};

/// Converts decimal odds to an implied probability.
///
/// Returns `None` for zero, negative or non-finite odds.
///
/// # Examples
/// ```
/// use tennis_edge_core::odds::implied_probability;
///
/// assert_eq!(implied_probability(2.0), Some(0.5));
/// assert_eq!(implied_probability(0.0), None);
/// ```
#[must_use]
pub fn implied_probability(decimal_odds: f64) -> Option<f64> {
    if decimal_odds.is_finite() && decimal_odds > 0.0 {
        Some(1.0 / decimal_odds)
    } else {
        None
    }
}

/// Removes the bookmaker margin from a two-outcome implied pair.
///
/// `p_fair_i = p_implied_i / (p1_implied + p2_implied)`. When the sum is
/// exactly zero the inputs are returned unchanged; callers that rely on the
/// output summing to one must guard that case.
#[must_use]
pub fn remove_vig_two_outcome(p1_implied: f64, p2_implied: f64) -> (f64, f64) {
    let total = p1_implied + p2_implied;
    if total == 0.0 {
        return (p1_implied, p2_implied);
    }
    (p1_implied / total, p2_implied / total)
}

/// Converts a probability to fair decimal odds.
///
/// Returns `None` when the probability is not strictly positive.
#[must_use]
pub fn fair_odds(probability: f64) -> Option<f64> {
    if probability.is_finite() && probability > 0.0 {
        Some(1.0 / probability)
    } else {
        None
    }
}

/// Bookmaker margin (overround) of an implied pair: `p1 + p2 - 1`.
#[must_use]
pub fn overround(p1_implied: f64, p2_implied: f64) -> f64 {
    p1_implied + p2_implied - 1.0
}

/// Decimal odds quoted for both players of a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketOdds {
    /// Decimal odds on player 1.
    pub p1: f64,
    /// Decimal odds on player 2.
    pub p2: f64,
}

/// Implied and margin-free probabilities for one market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketProbabilities {
    /// Implied probability of player 1 (includes margin).
    pub p1_implied: f64,
    /// Implied probability of player 2 (includes margin).
    pub p2_implied: f64,
    /// Fair probability of player 1.
    pub p1_fair: f64,
    /// Fair probability of player 2.
    pub p2_fair: f64,
}

impl MarketProbabilities {
    /// Bookmaker margin of this market.
    #[must_use]
    pub fn overround(&self) -> f64 {
        overround(self.p1_implied, self.p2_implied)
    }
}

impl MarketOdds {
    /// Creates a market from two decimal prices.
    #[must_use]
    pub fn new(p1: f64, p2: f64) -> Self {
        Self { p1, p2 }
    }

    /// Builds a market from optional prices, as read from historical data.
    ///
    /// Returns `None` if either side is absent or not a valid price.
    #[must_use]
    pub fn from_optional(p1: Option<f64>, p2: Option<f64>) -> Option<Self> {
        let market = Self::new(p1?, p2?);
        market.is_valid().then_some(market)
    }

    /// True when both prices are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        implied_probability(self.p1).is_some() && implied_probability(self.p2).is_some()
    }

    /// Implied and fair probabilities, or `None` if either price is invalid.
    #[must_use]
    pub fn probabilities(&self) -> Option<MarketProbabilities> {
        let p1_implied = implied_probability(self.p1)?;
        let p2_implied = implied_probability(self.p2)?;
        let (p1_fair, p2_fair) = remove_vig_two_outcome(p1_implied, p2_implied);
        Some(MarketProbabilities {
            p1_implied,
            p2_implied,
            p1_fair,
            p2_fair,
        })
    }
}
