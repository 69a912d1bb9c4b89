//! Single-market betting decision.
//!
//! Combines odds conversion, edge classification and Kelly sizing into one
//! call usable outside a backtest, e.g. by a live-signal service.

use serde::{Deserialize, Serialize};

use crate::edge::{EdgeAssessment, EdgeClassifier, Selection, Side};
use crate::kelly::KellySizer;
use crate::odds::{fair_odds, MarketOdds};

/// Reason attached to a betting decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetReason {
    /// A side cleared the edge threshold and received a positive stake.
    PositiveEdge,
    /// A side cleared the edge threshold but Kelly sizing returned zero.
    ZeroStake,
    /// Neither side reached the edge threshold.
    InsufficientEdge,
    /// One of the decimal odds was missing, zero or negative.
    InvalidOdds,
}

/// Decision for a single market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetDecision {
    /// Chosen side, `None` when passing.
    pub side: Option<Side>,
    /// Stake to place (zero when passing).
    pub stake: f64,
    /// Expected profit of the stake.
    pub expected_value: f64,
    /// Model probability of the chosen side.
    pub probability: Option<f64>,
    /// Decimal odds on the chosen side.
    pub decimal_odds: Option<f64>,
    /// Full Kelly fraction for the chosen side.
    pub full_kelly_fraction: f64,
    /// Edge breakdown, absent when the odds were invalid.
    pub assessment: Option<EdgeAssessment>,
    /// Fair odds for player 1, when computable.
    pub p1_fair_odds: Option<f64>,
    /// Fair odds for player 2, when computable.
    pub p2_fair_odds: Option<f64>,
    /// Why the decision was made.
    pub reason: BetReason,
}

impl BetDecision {
    fn pass(reason: BetReason, assessment: Option<EdgeAssessment>) -> Self {
        Self {
            side: None,
            stake: 0.0,
            expected_value: 0.0,
            probability: None,
            decimal_odds: None,
            full_kelly_fraction: 0.0,
            p1_fair_odds: assessment.and_then(|a| fair_odds(a.market.p1_fair)),
            p2_fair_odds: assessment.and_then(|a| fair_odds(a.market.p2_fair)),
            assessment,
            reason,
        }
    }

    /// True if the decision places a positive stake.
    #[must_use]
    pub fn should_bet(&self) -> bool {
        self.side.is_some() && self.stake > 0.0
    }
}

/// Classifies a market and sizes the bet in one step.
///
/// Invalid odds produce a pass with [`BetReason::InvalidOdds`]; they are
/// never an error.
///
/// # Examples
/// ```
/// use tennis_edge_core::decision::classify_and_size;
/// use tennis_edge_core::edge::{EdgeClassifier, Side};
/// use tennis_edge_core::kelly::KellySizer;
///
/// let decision = classify_and_size(
///     0.60,
///     2.10,
///     2.00,
///     &EdgeClassifier::new(0.02),
///     &KellySizer::new(0.5, 0.02, 1000.0),
/// );
/// assert_eq!(decision.side, Some(Side::P1));
/// assert!((decision.stake - 20.0).abs() < 1e-9);
/// assert!((decision.expected_value - 5.2).abs() < 1e-9);
/// ```
#[must_use]
pub fn classify_and_size(
    p1_model: f64,
    p1_decimal_odds: f64,
    p2_decimal_odds: f64,
    classifier: &EdgeClassifier,
    sizer: &KellySizer,
) -> BetDecision {
    let odds = MarketOdds::new(p1_decimal_odds, p2_decimal_odds);
    let Some(assessment) = classifier.assess(p1_model, &odds) else {
        return BetDecision::pass(BetReason::InvalidOdds, None);
    };

    match assessment.selection {
        Selection::Pass => BetDecision::pass(BetReason::InsufficientEdge, Some(assessment)),
        Selection::Bet {
            side,
            probability,
            decimal_odds,
            ..
        } => {
            let sized = sizer.size(probability, decimal_odds);
            let reason = if sized.stake > 0.0 {
                BetReason::PositiveEdge
            } else {
                BetReason::ZeroStake
            };
            BetDecision {
                side: Some(side),
                stake: sized.stake,
                expected_value: sized.expected_value,
                probability: Some(probability),
                decimal_odds: Some(decimal_odds),
                full_kelly_fraction: sized.full_kelly_fraction,
                p1_fair_odds: fair_odds(assessment.market.p1_fair),
                p2_fair_odds: fair_odds(assessment.market.p2_fair),
                assessment: Some(assessment),
                reason,
            }
        }
    }
}
