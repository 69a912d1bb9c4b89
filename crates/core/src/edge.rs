//! Edge classification between model and market probabilities.
//!
//! Edge on a side is the model probability minus the margin-free market
//! probability for that side. The classifier abstains unless the larger of
//! the two edges reaches the configured threshold.

use serde::{Deserialize, Serialize};

use crate::odds::{MarketOdds, MarketProbabilities};

/// Default minimum edge required to bet.
pub const DEFAULT_EDGE_MIN: f64 = 0.02;

/// One side of a two-player match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Player 1.
    P1,
    /// Player 2.
    P2,
}

impl Side {
    /// True if this side won, given a label that is `true` when player 1 won.
    #[must_use]
    pub fn won(self, p1_won: bool) -> bool {
        match self {
            Self::P1 => p1_won,
            Self::P2 => !p1_won,
        }
    }

    /// Short label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    /// Abstain: neither edge reaches the threshold.
    Pass,
    /// Bet on `side`.
    Bet {
        /// Chosen side.
        side: Side,
        /// Model probability of the chosen side.
        probability: f64,
        /// Decimal odds offered on the chosen side.
        decimal_odds: f64,
        /// Edge on the chosen side.
        edge: f64,
    },
}

impl Selection {
    /// Returns the chosen side, if any.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        match self {
            Self::Pass => None,
            Self::Bet { side, .. } => Some(*side),
        }
    }

    /// True if the classifier abstained.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Full edge breakdown for one market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeAssessment {
    /// Model probability that player 1 wins.
    pub p1_model: f64,
    /// Model probability that player 2 wins (`1 - p1_model`).
    pub p2_model: f64,
    /// Market probabilities for the match.
    pub market: MarketProbabilities,
    /// `p1_model - p1_fair`.
    pub p1_edge: f64,
    /// `p2_model - p2_fair`.
    pub p2_edge: f64,
    /// Selection produced by the classifier.
    pub selection: Selection,
}

/// Classifies a market against a minimum edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeClassifier {
    /// Minimum edge required to bet.
    pub edge_min: f64,
}

impl Default for EdgeClassifier {
    fn default() -> Self {
        Self {
            edge_min: DEFAULT_EDGE_MIN,
        }
    }
}

impl EdgeClassifier {
    /// Creates a classifier with the given threshold.
    #[must_use]
    pub fn new(edge_min: f64) -> Self {
        Self { edge_min }
    }

    /// Picks a side from the model probability of player 1 and fair market probabilities.
    ///
    /// Abstains when `max(edge1, edge2) < edge_min`. Otherwise the side with
    /// the larger edge is chosen; an exact tie goes to player 1.
    #[must_use]
    pub fn select(&self, p1_model: f64, p1_fair: f64, p2_fair: f64, odds: &MarketOdds) -> Selection {
        let p2_model = 1.0 - p1_model;
        let p1_edge = p1_model - p1_fair;
        let p2_edge = p2_model - p2_fair;

        let best = p1_edge.max(p2_edge);
        if best.is_nan() || best < self.edge_min {
            return Selection::Pass;
        }

        if p1_edge >= p2_edge {
            Selection::Bet {
                side: Side::P1,
                probability: p1_model,
                decimal_odds: odds.p1,
                edge: p1_edge,
            }
        } else {
            Selection::Bet {
                side: Side::P2,
                probability: p2_model,
                decimal_odds: odds.p2,
                edge: p2_edge,
            }
        }
    }

    /// Assesses a market end to end.
    ///
    /// Returns `None` when either price is not a valid decimal odds value.
    #[must_use]
    pub fn assess(&self, p1_model: f64, odds: &MarketOdds) -> Option<EdgeAssessment> {
        let market = odds.probabilities()?;
        let selection = self.select(p1_model, market.p1_fair, market.p2_fair, odds);
        Some(EdgeAssessment {
            p1_model,
            p2_model: 1.0 - p1_model,
            market,
            p1_edge: p1_model - market.p1_fair,
            p2_edge: (1.0 - p1_model) - market.p2_fair,
            selection,
        })
    }
}
