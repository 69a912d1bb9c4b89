//! Simulated trades and their settlement against the match result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tennis_edge_core::edge::Side;

/// A settled bet produced by one walk-forward step.
///
/// Trades are created once and never mutated; a run's ledger is the ordered
/// `Vec<Trade>` of all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Match the bet was placed on.
    pub match_id: i64,
    /// Match date.
    pub date: NaiveDate,
    /// Side backed.
    pub side: Side,
    /// Decimal odds taken.
    pub odds: f64,
    /// Model probability of the backed side.
    pub model_probability: f64,
    /// Amount staked, within `[0, max_stake_fraction * bankroll]`.
    pub stake: f64,
    /// Model probability minus fair market probability for the backed side.
    pub edge: f64,
    /// Expected profit at decision time.
    pub expected_value: f64,
    /// True if the backed side won.
    pub won: bool,
    /// Realised profit or loss.
    pub pnl: f64,
}

/// Decision-time fields of a bet, before the result is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBet {
    /// Match the bet is placed on.
    pub match_id: i64,
    /// Match date.
    pub date: NaiveDate,
    /// Side backed.
    pub side: Side,
    /// Decimal odds taken.
    pub odds: f64,
    /// Model probability of the backed side.
    pub model_probability: f64,
    /// Amount staked.
    pub stake: f64,
    /// Edge on the backed side.
    pub edge: f64,
    /// Expected profit.
    pub expected_value: f64,
}

impl PlacedBet {
    /// Settles the bet against the label (`true` when player 1 won).
    ///
    /// A win pays `stake * (odds - 1)`, a loss costs the stake.
    #[must_use]
    pub fn settle(self, p1_won: bool) -> Trade {
        let won = self.side.won(p1_won);
        let pnl = if won {
            self.stake * (self.odds - 1.0)
        } else {
            -self.stake
        };

        Trade {
            match_id: self.match_id,
            date: self.date,
            side: self.side,
            odds: self.odds,
            model_probability: self.model_probability,
            stake: self.stake,
            edge: self.edge,
            expected_value: self.expected_value,
            won,
            pnl,
        }
    }
}

/// ROI of a set of trades: total profit over total staked, zero when nothing was staked.
#[must_use]
pub fn ledger_roi<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> f64 {
    let (staked, profit) = trades
        .into_iter()
        .fold((0.0, 0.0), |(staked, profit), trade| {
            (staked + trade.stake, profit + trade.pnl)
        });
    if staked > 0.0 {
        profit / staked
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(side: Side, odds: f64, stake: f64) -> PlacedBet {
        PlacedBet {
            match_id: 7,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            side,
            odds,
            model_probability: 0.6,
            stake,
            edge: 0.1,
            expected_value: 5.2,
        }
    }

    // ============================================================
    // Settlement Tests
    // ============================================================

    #[test]
    fn winning_p1_bet_pays_net_odds() {
        let trade = placed(Side::P1, 2.1, 20.0).settle(true);
        assert!(trade.won);
        assert!((trade.pnl - 22.0).abs() < 1e-9);
        assert!((ledger_roi([&trade]) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn losing_p1_bet_costs_stake() {
        let trade = placed(Side::P1, 2.1, 20.0).settle(false);
        assert!(!trade.won);
        assert_eq!(trade.pnl, -20.0);
        assert_eq!(ledger_roi([&trade]), -1.0);
    }

    #[test]
    fn p2_bet_wins_when_player_one_loses() {
        let trade = placed(Side::P2, 1.5, 10.0).settle(false);
        assert!(trade.won);
        assert!((trade.pnl - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_stake_trade_has_zero_pnl() {
        let trade = placed(Side::P1, 2.0, 0.0).settle(false);
        assert_eq!(trade.pnl, 0.0);
        assert_eq!(ledger_roi([&trade]), 0.0);
    }

    // ============================================================
    // Ledger ROI Tests
    // ============================================================

    #[test]
    fn ledger_roi_is_profit_over_staked() {
        let trades = vec![
            placed(Side::P1, 2.0, 10.0).settle(true),
            placed(Side::P1, 2.0, 30.0).settle(false),
        ];
        // (10 - 30) / 40
        assert!((ledger_roi(&trades) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn ledger_roi_of_empty_ledger_is_zero() {
        assert_eq!(ledger_roi(std::iter::empty::<&Trade>()), 0.0);
    }

    #[test]
    fn trade_serializes_with_side_label_and_iso_date() {
        let trade = placed(Side::P2, 1.5, 10.0).settle(false);
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["side"], "P2");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["won"], true);
    }
}
