//! CLI commands for backtesting and bet sizing.

pub mod backtest;
pub mod evaluate;
pub mod signal;

pub use backtest::{run_backtest_command, BacktestArgs};
pub use evaluate::{run_evaluate, EvaluateArgs};
pub use signal::{run_signal, SignalArgs};

use anyhow::{anyhow, Result};
use clap::Args;
use tennis_edge_core::{BacktestConfig, ConfigLoader};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

/// Edge threshold and stake sizing overrides shared by several commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SizingArgs {
    /// Minimum edge over the fair market probability (default: 0.02)
    #[arg(long)]
    pub edge_min: Option<f64>,

    /// Fraction of full Kelly to stake (default: 0.25)
    #[arg(long)]
    pub kelly_multiplier: Option<f64>,

    /// Per-bet stake cap as a fraction of bankroll (default: 0.05)
    #[arg(long)]
    pub max_stake_fraction: Option<f64>,

    /// Reference bankroll (default: 1000)
    #[arg(long)]
    pub bankroll: Option<f64>,
}

impl SizingArgs {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: BacktestConfig) -> BacktestConfig {
        if let Some(edge_min) = self.edge_min {
            config.edge_min = edge_min;
        }
        if let Some(multiplier) = self.kelly_multiplier {
            config.kelly_multiplier = multiplier;
        }
        if let Some(cap) = self.max_stake_fraction {
            config.max_stake_fraction = cap;
        }
        if let Some(bankroll) = self.bankroll {
            config.bankroll = bankroll;
        }
        config
    }
}

/// Loads configuration from an explicit file, or from the default layers.
pub fn load_config(path: Option<&str>) -> Result<BacktestConfig> {
    match path {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::load(),
    }
}
