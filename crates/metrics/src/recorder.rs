//! The metrics recorder: append-only during the loop, summarized after.

use ashare_types::{EquityPoint, Fill, Stats};

use crate::compute::compute_stats;

/// Collects the equity curve, benchmark curve, and fills over a run.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    equity_curve: Vec<EquityPoint>,
    benchmark_curve: Vec<EquityPoint>,
    fills: Vec<Fill>,
}

impl MetricsRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one end-of-bar equity sample.
    pub fn record_equity(&mut self, timestamp_ns: i64, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp_ns, equity });
    }

    /// Appends one benchmark buy-and-hold sample.
    pub fn record_benchmark(&mut self, timestamp_ns: i64, equity: f64) {
        self.benchmark_curve.push(EquityPoint { timestamp_ns, equity });
    }

    /// Appends executed fills in execution order.
    pub fn record_fills(&mut self, fills: &[Fill]) {
        self.fills.extend_from_slice(fills);
    }

    /// The equity curve so far.
    #[must_use]
    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// The benchmark curve so far.
    #[must_use]
    pub fn benchmark_curve(&self) -> &[EquityPoint] {
        &self.benchmark_curve
    }

    /// Fills recorded so far.
    #[must_use]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Computes the terminal statistics.
    #[must_use]
    pub fn finalize(&self, initial_cash: f64, annualization_scale: Option<f64>) -> Stats {
        compute_stats(
            initial_cash,
            &self.equity_curve,
            &self.benchmark_curve,
            &self.fills,
            annualization_scale,
        )
    }

    /// Consumes the recorder into its curves and fills.
    #[must_use]
    pub fn into_parts(self) -> (Vec<EquityPoint>, Vec<EquityPoint>, Vec<Fill>) {
        (self.equity_curve, self.benchmark_curve, self.fills)
    }
}
