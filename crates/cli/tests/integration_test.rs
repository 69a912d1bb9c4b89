use std::path::PathBuf;

use tennis_edge_backtest::{evaluate_holdout, load_matches_csv, run_backtest};
use tennis_edge_core::{classify_and_size, BacktestConfig, ModelConfig, ModelKind, Side};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.csv")
}

fn config() -> BacktestConfig {
    BacktestConfig::default()
        .with_features(["elo_diff", "h2h_p1", "form_p1", "form_p2"])
        .with_min_train_size(6)
        .with_bootstrap(500, Some(42))
}

#[test]
fn test_load_sample_dataset() {
    let matches = load_matches_csv(sample_path()).expect("Failed to load test data");

    assert_eq!(matches.len(), 40);
    assert!(matches.windows(2).all(|w| w[0].date <= w[1].date));
    assert!(matches.iter().all(|m| m.label.is_some()));
    assert_eq!(matches.iter().filter(|m| m.p2_odd.is_none()).count(), 1);
}

#[test]
fn test_walk_forward_backtest_on_sample() {
    let matches = load_matches_csv(sample_path()).expect("Failed to load test data");

    let report = run_backtest(&matches, &config()).expect("Backtest failed");
    let summary = &report.summary;

    assert_eq!(summary.steps_evaluated, 34);
    assert_eq!(report.predictions.len(), 34);
    assert_eq!(summary.skipped.invalid_odds, 1);
    assert_eq!(summary.trades, report.ledger.len());
    assert_eq!(summary.trades + summary.skipped.total(), summary.steps_evaluated);

    for trade in &report.ledger {
        assert!(trade.stake >= 0.0);
        assert!(trade.stake <= 0.05 * 1000.0 + 1e-9);
    }

    let profit: f64 = report.ledger.iter().map(|t| t.pnl).sum();
    assert!((summary.profit - profit).abs() < 1e-9);
    if summary.total_staked > 0.0 {
        assert!(summary.roi_ci.0 <= summary.roi_ci.1);
    }
}

#[test]
fn test_backtest_is_reproducible_with_seed() {
    let matches = load_matches_csv(sample_path()).expect("Failed to load test data");

    let a = run_backtest(&matches, &config()).expect("Backtest failed");
    let b = run_backtest(&matches, &config()).expect("Backtest failed");

    assert_eq!(a.summary, b.summary);
    assert_eq!(a.ledger, b.ledger);
}

#[test]
fn test_base_rate_model_on_sample() {
    let matches = load_matches_csv(sample_path()).expect("Failed to load test data");
    let config = config().with_model(ModelConfig {
        kind: ModelKind::BaseRate,
        ..ModelConfig::default()
    });

    let report = run_backtest(&matches, &config).expect("Backtest failed");
    assert_eq!(report.summary.steps_evaluated, 34);
}

#[test]
fn test_holdout_evaluation_on_sample() {
    let matches = load_matches_csv(sample_path()).expect("Failed to load test data");

    let report = evaluate_holdout(&matches, &config(), 0.25).expect("Evaluation failed");

    assert_eq!(report.test_size, 10);
    assert_eq!(report.train_size, 30);
    assert_eq!(report.metrics.n, 10);
    assert!((0.0..=1.0).contains(&report.metrics.brier));
}

#[test]
fn test_classify_and_size_single_market() {
    let config = BacktestConfig::default().with_sizing(0.5, 0.02, 1000.0);

    let decision = classify_and_size(0.60, 2.10, 2.00, &config.classifier(), &config.sizer());

    assert_eq!(decision.side, Some(Side::P1));
    assert!((decision.stake - 20.0).abs() < 1e-9);
}
