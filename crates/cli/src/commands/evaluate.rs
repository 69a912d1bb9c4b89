//! Holdout evaluation command.

use anyhow::{Context, Result};
use clap::Args;

use tennis_edge_backtest::{evaluate_holdout, load_matches_csv, HoldoutReport, DEFAULT_TEST_FRACTION};

use super::backtest::parse_model_kind;
use super::{load_config, OutputFormat};

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Match dataset CSV file
    #[arg(short, long)]
    pub data: String,

    /// Config file path (defaults to config/Backtest.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Comma-separated feature names, in model order
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Share of the most recent labelled matches held out for scoring
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    pub test_fraction: f64,

    /// Probability model: logistic, base_rate
    #[arg(long)]
    pub model: Option<String>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Formats a holdout report as text.
pub(crate) fn format_holdout(report: &HoldoutReport) -> String {
    let metrics = &report.metrics;
    let mut output = String::new();

    output.push_str("===============================================================\n");
    output.push_str("                     HOLDOUT EVALUATION                        \n");
    output.push_str("===============================================================\n");
    output.push_str(&format!("Model:          {}\n", report.model));
    output.push_str(&format!("Train / Test:   {} / {}\n", report.train_size, report.test_size));
    output.push_str(&format!("Skipped:        {}\n", report.skipped));
    output.push_str("---------------------------------------------------------------\n");
    output.push_str(&format!("Brier Score:    {:.4}\n", metrics.brier));
    output.push_str(&format!("Log Loss:       {:.4}\n", metrics.log_loss));
    output.push_str(&format!("Accuracy:       {:.1}%\n", metrics.accuracy * 100.0));
    match metrics.roc_auc {
        Some(auc) => output.push_str(&format!("ROC AUC:        {auc:.4}\n")),
        None => output.push_str("ROC AUC:        n/a\n"),
    }
    output.push_str("===============================================================\n");

    output
}

/// Runs the evaluate command.
///
/// # Errors
/// Returns an error if the configuration is invalid, the dataset cannot be
/// read or split, or the model cannot be fitted.
pub async fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(features) = &args.features {
        config.features = features.iter().map(|f| f.trim().to_string()).collect();
    }
    if let Some(model) = &args.model {
        config.model.kind = parse_model_kind(model)?;
    }
    config.validate()?;

    tracing::info!(
        "Evaluating {:?} on {} (test fraction {})",
        config.model.kind,
        args.data,
        args.test_fraction
    );

    let data = args.data.clone();
    let test_fraction = args.test_fraction;
    let report = tokio::task::spawn_blocking(move || -> Result<HoldoutReport> {
        let matches = load_matches_csv(&data)?;
        Ok(evaluate_holdout(&matches, &config, test_fraction)?)
    })
    .await
    .context("evaluation task failed")??;

    match format {
        OutputFormat::Text => println!("{}", format_holdout(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tennis_edge_core::ForecastMetrics;

    #[test]
    fn formats_holdout_report() {
        let report = HoldoutReport {
            model: "logistic_regression".to_string(),
            train_size: 30,
            test_size: 11,
            skipped: 2,
            metrics: ForecastMetrics::from_predictions(&[(0.8, true), (0.3, false)]),
        };
        let text = format_holdout(&report);

        assert!(text.contains("Model:          logistic_regression"));
        assert!(text.contains("Train / Test:   30 / 11"));
        assert!(text.contains("Accuracy:       100.0%"));
        assert!(text.contains("ROC AUC:        1.0000"));
    }
}
