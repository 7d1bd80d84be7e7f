//! Backtest report assembly helpers.

use ashare_metrics::MetricsRecorder;
use ashare_types::{BacktestReport, Stats};

/// Builds the final report payload from the recorder's curves and fills.
#[must_use]
pub(crate) fn build_report(
    stats: Stats,
    metrics: MetricsRecorder,
    warnings: Vec<String>,
) -> BacktestReport {
    let (equity_curve, benchmark_curve, fills) = metrics.into_parts();
    BacktestReport {
        stats,
        equity_curve,
        benchmark_curve,
        fills,
        warnings,
    }
}
