use clap::{Parser, Subcommand};

mod commands;

use commands::{BacktestArgs, EvaluateArgs, SignalArgs};

#[derive(Parser)]
#[command(name = "tennis-edge")]
#[command(about = "Edge detection, Kelly sizing and walk-forward backtests for tennis markets", long_about = None)]
struct Cli {
    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a match dataset through the walk-forward backtester
    Backtest(BacktestArgs),
    /// Classify and size a single market
    Signal(SignalArgs),
    /// Score the probability model on a time-ordered holdout split
    Evaluate(EvaluateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            // Reports go to stdout, keep logs off it
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    match cli.command {
        Commands::Backtest(args) => {
            commands::run_backtest_command(args).await?;
        }
        Commands::Signal(args) => {
            commands::run_signal(args).await?;
        }
        Commands::Evaluate(args) => {
            commands::run_evaluate(args).await?;
        }
    }

    Ok(())
}
