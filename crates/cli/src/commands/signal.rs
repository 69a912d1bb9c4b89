//! Single-market bet signal command.
//!
//! Classifies one match from a model probability and the quoted decimal odds
//! and prints the sized bet.

use anyhow::{bail, Result};
use clap::Args;

use tennis_edge_core::{classify_and_size, BetDecision, BetReason};

use super::{load_config, OutputFormat, SizingArgs};

/// Arguments for the signal command.
#[derive(Args, Debug, Clone)]
pub struct SignalArgs {
    /// Model probability that player 1 wins
    #[arg(long)]
    pub p1_prob: f64,

    /// Decimal odds on player 1
    #[arg(long)]
    pub p1_odds: f64,

    /// Decimal odds on player 2
    #[arg(long)]
    pub p2_odds: f64,

    #[command(flatten)]
    pub sizing: SizingArgs,

    /// Config file path (defaults to config/Backtest.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

fn decision_label(decision: &BetDecision) -> String {
    match decision.side {
        Some(side) if decision.should_bet() => side.to_string(),
        Some(side) => format!("{side} (zero stake)"),
        None => "PASS".to_string(),
    }
}

fn odds_label(odds: Option<f64>) -> String {
    odds.map_or_else(|| "n/a".to_string(), |o| format!("{o:.3}"))
}

/// Formats a decision as text.
pub(crate) fn format_decision(decision: &BetDecision) -> String {
    let mut output = String::new();

    output.push_str("===============================================================\n");
    output.push_str("                        BET SIGNAL                             \n");
    output.push_str("===============================================================\n");
    output.push_str(&format!("Decision:       {}\n", decision_label(decision)));
    output.push_str(&format!("Reason:         {:?}\n", decision.reason));

    if let Some(assessment) = &decision.assessment {
        output.push_str(&format!(
            "Market Fair:    P1 {:.2}%  P2 {:.2}%  (overround {:.2}%)\n",
            assessment.market.p1_fair * 100.0,
            assessment.market.p2_fair * 100.0,
            assessment.market.overround() * 100.0
        ));
        output.push_str(&format!(
            "Fair Odds:      P1 {}  P2 {}\n",
            odds_label(decision.p1_fair_odds),
            odds_label(decision.p2_fair_odds)
        ));
        output.push_str(&format!(
            "Edge:           P1 {:+.2}%  P2 {:+.2}%\n",
            assessment.p1_edge * 100.0,
            assessment.p2_edge * 100.0
        ));
    }

    if decision.side.is_some() {
        output.push_str(&format!(
            "Full Kelly:     {:.2}%\n",
            decision.full_kelly_fraction * 100.0
        ));
        output.push_str(&format!("Stake:          {:.2}\n", decision.stake));
        output.push_str(&format!("Expected Value: {:+.2}\n", decision.expected_value));
    }
    output.push_str("===============================================================\n");

    output
}

/// Runs the signal command.
///
/// # Errors
/// Returns an error if the probability is outside `[0, 1]` or the
/// configuration is invalid. Unusable odds are reported as a pass.
pub async fn run_signal(args: SignalArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    if !(0.0..=1.0).contains(&args.p1_prob) {
        bail!("p1-prob must be within [0, 1], got {}", args.p1_prob);
    }

    let config = args.sizing.apply(load_config(args.config.as_deref())?);
    config.validate()?;

    let decision = classify_and_size(
        args.p1_prob,
        args.p1_odds,
        args.p2_odds,
        &config.classifier(),
        &config.sizer(),
    );

    if decision.reason == BetReason::InvalidOdds {
        tracing::warn!(
            "Odds {} / {} are not usable; passing",
            args.p1_odds,
            args.p2_odds
        );
    }

    match format {
        OutputFormat::Text => println!("{}", format_decision(&decision)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decision)?),
    }

    Ok(())
}
