//! High-level backtest runner.

use std::collections::BTreeMap;

use ashare_strategy::Strategy;
use ashare_types::{BacktestConfig, BacktestReport, Bar};

use crate::engine::BacktestEngine;
use crate::error::BacktestError;

/// Main entry point: wires data and benchmark into an engine and runs the
/// strategy against them.
///
/// The benchmark map's first entry (in sorted key order) defines the
/// benchmark timeline; additional entries are ignored.
///
/// # Errors
/// - [`BacktestError::ConfigValidation`] for invalid configuration.
/// - [`BacktestError::Data`] for a missing/empty/non-monotonic benchmark.
/// - Any fatal error from the run itself.
pub fn run_backtest(
    config: BacktestConfig,
    strategy: &mut dyn Strategy,
    data: BTreeMap<String, Vec<Bar>>,
    benchmark: BTreeMap<String, Vec<Bar>>,
) -> Result<BacktestReport, BacktestError> {
    let mut engine = BacktestEngine::new(config)?;

    let (benchmark_name, benchmark_bars) = benchmark
        .into_iter()
        .next()
        .ok_or(BacktestError::Data(ashare_data::DataError::EmptyBenchmark))?;
    tracing::info!("Benchmark timeline from '{}'", benchmark_name);
    engine.set_benchmark(benchmark_bars)?;

    for (symbol, bars) in data {
        engine.add_market_data(symbol, bars)?;
    }

    engine.run(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Strategy for Noop {}

    fn bar(ts: i64, close: f64) -> Bar {
        Bar {
            timestamp_ns: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
            amount: None,
            suspended: false,
        }
    }

    #[test]
    fn test_missing_benchmark_is_fatal() {
        let result = run_backtest(
            BacktestConfig::default(),
            &mut Noop,
            BTreeMap::new(),
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(BacktestError::Data(_))));
    }

    #[test]
    fn test_invalid_config_is_fatal_before_loop() {
        let config = BacktestConfig {
            commission_rate: -1.0,
            ..BacktestConfig::default()
        };
        let result = run_backtest(config, &mut Noop, BTreeMap::new(), BTreeMap::new());
        assert!(matches!(result, Err(BacktestError::ConfigValidation(_))));
    }

    #[test]
    fn test_bad_date_bound_is_fatal() {
        let config = BacktestConfig {
            start: Some("not-a-date".to_string()),
            ..BacktestConfig::default()
        };
        let result = run_backtest(config, &mut Noop, BTreeMap::new(), BTreeMap::new());
        assert!(matches!(result, Err(BacktestError::ConfigValidation(_))));
    }

    #[test]
    fn test_noop_run_produces_flat_curve() {
        let mut benchmark = BTreeMap::new();
        benchmark.insert(
            "000300.SH".to_string(),
            vec![bar(0, 100.0), bar(86_400_000_000_000, 101.0)],
        );
        let report = run_backtest(
            BacktestConfig::default(),
            &mut Noop,
            BTreeMap::new(),
            benchmark,
        )
        .unwrap();

        assert_eq!(report.equity_curve.len(), 2);
        assert!(report.fills.is_empty());
        assert!((report.stats.total_return).abs() < 1e-12);
        assert_eq!(report.benchmark_curve.len(), 2);
    }
}
