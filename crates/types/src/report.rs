//! Backtest report types.

use serde::{Deserialize, Serialize};

use crate::order::Fill;

/// One sample of the equity (or benchmark) curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Bar timestamp
    pub timestamp_ns: i64,
    /// Total account value at end of bar
    pub equity: f64,
}

/// Terminal summary statistics.
///
/// Annualized figures are `None` when the bar period is unknown; benchmark
/// figures are `None` when no benchmark curve was recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    /// `E_T / E_0 - 1`
    pub total_return: f64,
    /// Geometric annualization of the total return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annualized_return: Option<f64>,
    /// Largest peak-to-trough equity loss, as a fraction of the peak
    pub max_drawdown: f64,
    /// Timestamp of the peak preceding the maximum drawdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown_start: Option<i64>,
    /// Timestamp of the trough of the maximum drawdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown_end: Option<i64>,
    /// Mean over stdev of per-bar returns, annualized
    pub sharpe_ratio: f64,
    /// Winning fraction of closed round trips
    pub win_rate: f64,
    /// Average winning P/L over average losing P/L
    pub profit_loss_ratio: f64,
    /// Number of buy fills
    pub open_count: usize,
    /// Number of sell fills
    pub close_count: usize,
    /// Benchmark buy-and-hold total return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_return: Option<f64>,
    /// Benchmark annualized return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_annualized_return: Option<f64>,
    /// Benchmark maximum drawdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_max_drawdown: Option<f64>,
}

/// Everything a completed run hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Summary statistics
    pub stats: Stats,
    /// Per-bar equity samples
    pub equity_curve: Vec<EquityPoint>,
    /// Benchmark buy-and-hold curve scaled to initial cash
    pub benchmark_curve: Vec<EquityPoint>,
    /// Every executed fill in execution order
    pub fills: Vec<Fill>,
    /// Non-fatal data and order warnings collected during the run
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serde_skips_absent_options() {
        let stats = Stats::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(!json.contains("annualized_return"));
        assert!(!json.contains("benchmark_return"));
    }

    #[test]
    fn test_report_roundtrip() {
        let report = BacktestReport {
            stats: Stats {
                total_return: 0.12,
                annualized_return: Some(0.25),
                ..Stats::default()
            },
            equity_curve: vec![EquityPoint {
                timestamp_ns: 0,
                equity: 100_000.0,
            }],
            benchmark_curve: Vec::new(),
            fills: Vec::new(),
            warnings: vec!["dropped 1 bar outside benchmark timeline".to_string()],
        };

        let json = serde_json::to_string(&report).unwrap();
        let deserialized: BacktestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.equity_curve.len(), 1);
        assert_eq!(deserialized.warnings.len(), 1);
        assert_eq!(deserialized.stats.annualized_return, Some(0.25));
    }
}
