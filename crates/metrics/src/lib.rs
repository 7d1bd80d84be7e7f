//! # Ashare Metrics
//!
//! Append-only recording of the equity curve, benchmark curve, and fills
//! during the run, and terminal summary statistics afterwards.

#![deny(clippy::all)]

pub mod compute;
pub mod equity_metrics;
pub mod recorder;
pub mod trade_metrics;

pub use compute::compute_stats;
pub use recorder::MetricsRecorder;
pub use trade_metrics::{pair_round_trips, RoundTrip};
