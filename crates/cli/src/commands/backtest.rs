//! Walk-forward backtest CLI command.
//!
//! Loads a match dataset from CSV, replays it through the walk-forward
//! backtester and reports the ledger summary with its bootstrap ROI interval.

use anyhow::{anyhow, Context, Result};
use clap::Args;

use tennis_edge_backtest::{load_matches_csv, run_backtest, BacktestReport, Trade};
use tennis_edge_core::{BacktestConfig, FitFailurePolicy, ModelKind};

use super::{load_config, OutputFormat, SizingArgs};

/// Arguments for the backtest command.
#[derive(Args, Debug, Clone)]
pub struct BacktestArgs {
    /// Match dataset CSV file
    #[arg(short, long)]
    pub data: String,

    /// Config file path (defaults to config/Backtest.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Comma-separated feature names, in model order
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    #[command(flatten)]
    pub sizing: SizingArgs,

    /// Matches used for warmup before the first evaluated one (default: 6)
    #[arg(long)]
    pub min_train_size: Option<usize>,

    /// Bootstrap resamples for the ROI interval (default: 1000)
    #[arg(long)]
    pub bootstrap_iters: Option<usize>,

    /// Seed for the bootstrap resampler
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability model: logistic, base_rate
    #[arg(long)]
    pub model: Option<String>,

    /// Skip steps whose training window cannot be fitted instead of aborting
    #[arg(long)]
    pub skip_fit_failures: bool,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the JSON report to a file
    #[arg(long)]
    pub output: Option<String>,

    /// Write the trade ledger to a CSV file
    #[arg(long)]
    pub ledger: Option<String>,
}

/// Parses a model name.
pub(crate) fn parse_model_kind(s: &str) -> Result<ModelKind> {
    match s.to_lowercase().as_str() {
        "logistic" | "logistic_regression" => Ok(ModelKind::Logistic),
        "base_rate" | "baseline" => Ok(ModelKind::BaseRate),
        _ => Err(anyhow!(
            "Unknown model: '{}'. Valid models: logistic, base_rate",
            s
        )),
    }
}

impl BacktestArgs {
    /// Resolves the configuration: file and environment first, then flags.
    fn resolve_config(&self) -> Result<BacktestConfig> {
        let mut config = self.sizing.apply(load_config(self.config.as_deref())?);

        if let Some(features) = &self.features {
            config.features = features.iter().map(|f| f.trim().to_string()).collect();
        }
        if let Some(min_train_size) = self.min_train_size {
            config.min_train_size = min_train_size;
        }
        if let Some(iterations) = self.bootstrap_iters {
            config.bootstrap_iters = iterations;
        }
        if self.seed.is_some() {
            config.bootstrap_seed = self.seed;
        }
        if let Some(model) = &self.model {
            config.model.kind = parse_model_kind(model)?;
        }
        if self.skip_fit_failures {
            config.fit_failure_policy = FitFailurePolicy::Skip;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Formats a backtest report as text.
pub(crate) fn format_text_report(report: &BacktestReport, config: &BacktestConfig) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    output.push('\n');
    output.push_str("===============================================================\n");
    output.push_str("                  WALK-FORWARD BACKTEST RESULTS                \n");
    output.push_str("===============================================================\n");

    if let (Some(first), Some(last)) = (report.predictions.first(), report.predictions.last()) {
        output.push_str(&format!(
            "Period: {} to {}\n",
            first.date.format("%Y-%m-%d"),
            last.date.format("%Y-%m-%d")
        ));
    }
    output.push_str(&format!("Model: {:?}\n", config.model.kind));
    output.push_str(&format!("Features: {}\n", config.features.join(", ")));
    output.push_str(&format!(
        "Edge Min: {:.1}%  Kelly: {:.2}x  Cap: {:.1}%  Bankroll: {:.2}\n",
        config.edge_min * 100.0,
        config.kelly_multiplier,
        config.max_stake_fraction * 100.0,
        config.bankroll
    ));
    output.push('\n');

    output.push_str("CORE METRICS\n");
    output.push_str("---------------------------------------------------------------\n");
    output.push_str(&format!("Trades:         {}\n", summary.trades));
    output.push_str(&format!(
        "Wins:           {} ({:.1}%)\n",
        summary.wins,
        summary.win_rate * 100.0
    ));
    output.push_str(&format!(
        "Wilson 95% CI:  [{:.1}%, {:.1}%]\n",
        summary.win_rate_ci.0 * 100.0,
        summary.win_rate_ci.1 * 100.0
    ));
    output.push('\n');

    output.push_str("FINANCIAL METRICS\n");
    output.push_str("---------------------------------------------------------------\n");
    output.push_str(&format!("Total Staked:   {:.2}\n", summary.total_staked));
    output.push_str(&format!("Profit:         {:.2}\n", summary.profit));
    output.push_str(&format!("Expected Value: {:.2}\n", summary.expected_value));
    output.push_str(&format!("ROI:            {:.2}%\n", summary.roi * 100.0));
    output.push_str(&format!(
        "ROI {:.0}% CI:     [{:.2}%, {:.2}%]\n",
        config.confidence_level * 100.0,
        summary.roi_ci.0 * 100.0,
        summary.roi_ci.1 * 100.0
    ));
    output.push_str(&format!(
        "CI Excludes 0:  {}\n",
        if summary.roi_excludes_zero { "yes" } else { "no" }
    ));
    output.push_str(&format!("Max Drawdown:   {:.2}\n", summary.max_drawdown));
    output.push('\n');

    output.push_str("FORECAST QUALITY\n");
    output.push_str("---------------------------------------------------------------\n");
    let forecast = &summary.forecast;
    output.push_str(&format!("Scored Matches: {}\n", forecast.n));
    output.push_str(&format!("Brier Score:    {:.4}\n", forecast.brier));
    output.push_str(&format!("Log Loss:       {:.4}\n", forecast.log_loss));
    output.push_str(&format!("Accuracy:       {:.1}%\n", forecast.accuracy * 100.0));
    match forecast.roc_auc {
        Some(auc) => output.push_str(&format!("ROC AUC:        {auc:.4}\n")),
        None => output.push_str("ROC AUC:        n/a\n"),
    }
    output.push('\n');

    output.push_str("PROCESSING STATS\n");
    output.push_str("---------------------------------------------------------------\n");
    let skipped = &summary.skipped;
    output.push_str(&format!("Steps Evaluated:   {}\n", summary.steps_evaluated));
    output.push_str(&format!("Passed (no edge):  {}\n", skipped.passes));
    output.push_str(&format!("Invalid Odds:      {}\n", skipped.invalid_odds));
    output.push_str(&format!("Missing Features:  {}\n", skipped.missing_features));
    output.push_str(&format!("Missing Label:     {}\n", skipped.missing_label));
    output.push_str(&format!("Empty Window:      {}\n", skipped.empty_window));
    output.push_str(&format!("Fit Failures:      {}\n", skipped.fit_failures));
    output.push_str("===============================================================\n");

    output
}

/// Writes the trade ledger as CSV.
pub(crate) fn write_ledger_csv(path: &str, ledger: &[Trade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create ledger file {path}"))?;
    for trade in ledger {
        writer.serialize(trade)?;
    }
    writer.flush()?;
    Ok(())
}

/// Runs the backtest command.
///
/// # Errors
/// Returns an error if the configuration is invalid, the dataset cannot be
/// read, or the backtest fails.
pub async fn run_backtest_command(args: BacktestArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let config = args.resolve_config()?;

    tracing::info!("Running walk-forward backtest on {}", args.data);
    tracing::info!("Features: {}", config.features.join(", "));

    let data = args.data.clone();
    let task_config = config.clone();
    let report = tokio::task::spawn_blocking(move || -> Result<BacktestReport> {
        let matches = load_matches_csv(&data)?;
        Ok(run_backtest(&matches, &task_config)?)
    })
    .await
    .context("backtest task failed")??;

    tracing::info!(
        "Backtest complete: {} trades, ROI {:.2}%",
        report.summary.trades,
        report.summary.roi * 100.0
    );

    match format {
        OutputFormat::Text => {
            println!("{}", format_text_report(&report, &config));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if let Some(output_path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("failed to write report to {output_path}"))?;
        tracing::info!("Report written to {}", output_path);
    }

    if let Some(ledger_path) = &args.ledger {
        write_ledger_csv(ledger_path, &report.ledger)?;
        tracing::info!("Ledger written to {}", ledger_path);
    }

    Ok(())
}
