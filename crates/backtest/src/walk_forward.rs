//! Walk-forward backtest over a time-ordered sequence of matches.
//!
//! The first `min_train_size` records are warmup. For every later record the
//! model is refitted on all usable records before it (expanding window, no
//! shuffling), the record is scored, classified against the de-vigged market
//! and, when a side is picked, sized with fractional Kelly and settled
//! against the label.
//!
//! # Step outcomes
//!
//! | Condition                         | Result                               |
//! |-----------------------------------|--------------------------------------|
//! | feature missing (no fill value)   | skipped, `missing_features`          |
//! | label missing                     | skipped, `missing_label`             |
//! | no usable earlier record          | skipped, `empty_window`              |
//! | model fails to fit                | error, or `fit_failures` under skip  |
//! | odds absent, zero or negative     | skipped, `invalid_odds`              |
//! | both edges below threshold        | no trade, `passes`                   |
//! | otherwise                         | trade appended to the ledger         |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tennis_edge_core::config::{BacktestConfig, FitFailurePolicy};
use tennis_edge_core::edge::{EdgeClassifier, Selection};
use tennis_edge_core::error::{EdgeError, Result};
use tennis_edge_core::kelly::KellySizer;
use tennis_edge_core::model::{ForecastMetrics, ProbabilityModel};
use tracing::{debug, info, warn};

use crate::bootstrap::BootstrapConfig;
use crate::record::{FeatureSchema, MatchRecord};
use crate::summary::{BacktestSummary, SkipCounts};
use crate::trade::{PlacedBet, Trade};

/// Out-of-sample probability for one scored match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Match scored.
    pub match_id: i64,
    /// Match date.
    pub date: NaiveDate,
    /// Model probability that player 1 wins.
    pub p1_probability: f64,
    /// True if player 1 won.
    pub p1_won: bool,
}

/// Ledger, summary and forecasts of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Trades in the order they were placed.
    pub ledger: Vec<Trade>,
    /// Aggregate statistics.
    pub summary: BacktestSummary,
    /// Every out-of-sample prediction, traded or not.
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    MissingFeatures,
    MissingLabel,
    EmptyWindow,
    FitFailure,
    InvalidOdds,
    Pass,
}

impl SkipCounts {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingFeatures => self.missing_features += 1,
            SkipReason::MissingLabel => self.missing_label += 1,
            SkipReason::EmptyWindow => self.empty_window += 1,
            SkipReason::FitFailure => self.fit_failures += 1,
            SkipReason::InvalidOdds => self.invalid_odds += 1,
            SkipReason::Pass => self.passes += 1,
        }
    }
}

enum StepOutcome {
    Traded(Trade),
    Skipped(SkipReason),
}

/// Runs a walk-forward backtest with the model named in the configuration.
///
/// # Errors
///
/// Returns [`EdgeError::InvalidConfig`] for a malformed configuration,
/// [`EdgeError::Dataset`] when records are not in date order, and
/// [`EdgeError::ModelFitting`] when a window cannot be fitted under
/// [`FitFailurePolicy::Abort`].
pub fn run_backtest(matches: &[MatchRecord], config: &BacktestConfig) -> Result<BacktestReport> {
    let model = config.model.build();
    run_backtest_with_model(matches, config, model.as_ref())
}

/// Runs a walk-forward backtest with an injected model.
///
/// Fewer records than `min_train_size` give an empty ledger and a zeroed
/// summary.
///
/// # Errors
///
/// See [`run_backtest`].
pub fn run_backtest_with_model(
    matches: &[MatchRecord],
    config: &BacktestConfig,
    model: &dyn ProbabilityModel,
) -> Result<BacktestReport> {
    config.validate()?;
    check_chronological(matches)?;

    info!(
        matches = matches.len(),
        min_train_size = config.min_train_size,
        features = config.features.len(),
        model = model.name(),
        "starting walk-forward backtest"
    );

    let schema = FeatureSchema::new(config.features.iter().cloned());
    let rows: Vec<Option<Vec<f64>>> = matches
        .iter()
        .map(|record| schema.extract(record, config.missing_feature_fill))
        .collect();

    let stepper = Stepper {
        config,
        model,
        classifier: config.classifier(),
        sizer: config.sizer(),
    };

    let mut train_features: Vec<Vec<f64>> = Vec::new();
    let mut train_labels: Vec<bool> = Vec::new();
    let mut ledger = Vec::new();
    let mut predictions = Vec::new();
    let mut skipped = SkipCounts::default();
    let mut steps_evaluated = 0;

    for (index, record) in matches.iter().enumerate() {
        let row = rows[index].as_deref();

        if index >= config.min_train_size {
            steps_evaluated += 1;
            let outcome = stepper.step(
                index,
                record,
                row,
                &train_features,
                &train_labels,
                &mut predictions,
            )?;
            match outcome {
                StepOutcome::Traded(trade) => {
                    debug!(
                        step = index,
                        match_id = record.match_id,
                        side = %trade.side,
                        stake = trade.stake,
                        pnl = trade.pnl,
                        "trade placed"
                    );
                    ledger.push(trade);
                }
                StepOutcome::Skipped(reason) => {
                    debug!(step = index, match_id = record.match_id, ?reason, "no trade");
                    skipped.record(reason);
                }
            }
        }

        // The window only grows after the record has been scored
        if let (Some(row), Some(label)) = (row, record.label) {
            train_features.push(row.to_vec());
            train_labels.push(label);
        }
    }

    let forecast_pairs: Vec<(f64, bool)> = predictions
        .iter()
        .map(|p: &Prediction| (p.p1_probability, p.p1_won))
        .collect();
    let summary = BacktestSummary::from_ledger(&ledger, &BootstrapConfig::from(config))
        .with_run_details(
            steps_evaluated,
            skipped,
            ForecastMetrics::from_predictions(&forecast_pairs),
        );

    info!(
        trades = summary.trades,
        steps = steps_evaluated,
        skipped = skipped.total(),
        roi = summary.roi,
        profit = summary.profit,
        "walk-forward backtest complete"
    );

    Ok(BacktestReport {
        ledger,
        summary,
        predictions,
    })
}

struct Stepper<'a> {
    config: &'a BacktestConfig,
    model: &'a dyn ProbabilityModel,
    classifier: EdgeClassifier,
    sizer: KellySizer,
}

impl Stepper<'_> {
    fn step(
        &self,
        index: usize,
        record: &MatchRecord,
        row: Option<&[f64]>,
        train_features: &[Vec<f64>],
        train_labels: &[bool],
        predictions: &mut Vec<Prediction>,
    ) -> Result<StepOutcome> {
        let Some(features) = row else {
            return Ok(StepOutcome::Skipped(SkipReason::MissingFeatures));
        };
        let Some(p1_won) = record.label else {
            return Ok(StepOutcome::Skipped(SkipReason::MissingLabel));
        };
        if train_features.is_empty() {
            return Ok(StepOutcome::Skipped(SkipReason::EmptyWindow));
        }

        let fitted = match self.model.fit(train_features, train_labels) {
            Ok(fitted) => fitted,
            Err(source) => match self.config.fit_failure_policy {
                FitFailurePolicy::Abort => {
                    return Err(EdgeError::ModelFitting {
                        step: index,
                        match_id: record.match_id,
                        source,
                    })
                }
                FitFailurePolicy::Skip => {
                    warn!(
                        step = index,
                        match_id = record.match_id,
                        error = %source,
                        "model fit failed, skipping step"
                    );
                    return Ok(StepOutcome::Skipped(SkipReason::FitFailure));
                }
            },
        };

        let p1_probability = fitted.predict_probability(features);
        predictions.push(Prediction {
            match_id: record.match_id,
            date: record.date,
            p1_probability,
            p1_won,
        });

        let Some(assessment) = record
            .market_odds()
            .and_then(|odds| self.classifier.assess(p1_probability, &odds))
        else {
            return Ok(StepOutcome::Skipped(SkipReason::InvalidOdds));
        };

        match assessment.selection {
            Selection::Pass => Ok(StepOutcome::Skipped(SkipReason::Pass)),
            Selection::Bet {
                side,
                probability,
                decimal_odds,
                edge,
            } => {
                let sized = self.sizer.size(probability, decimal_odds);
                let bet = PlacedBet {
                    match_id: record.match_id,
                    date: record.date,
                    side,
                    odds: decimal_odds,
                    model_probability: probability,
                    stake: sized.stake,
                    edge,
                    expected_value: sized.expected_value,
                };
                Ok(StepOutcome::Traded(bet.settle(p1_won)))
            }
        }
    }
}

fn check_chronological(matches: &[MatchRecord]) -> Result<()> {
    match matches.windows(2).find(|pair| pair[1].date < pair[0].date) {
        Some(pair) => Err(EdgeError::Dataset(format!(
            "match {} dated {} comes after match {} dated {}; records must be in date order",
            pair[1].match_id, pair[1].date, pair[0].match_id, pair[0].date
        ))),
        None => Ok(()),
    }
}
