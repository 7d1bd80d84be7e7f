//! Ashare Types
//!
//! Core data structures for the ashare backtest engine.
//! This crate provides types for bars, orders, fills, positions,
//! configuration, and backtest reports.

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

/// Bar (OHLCV) data structures.
pub mod bar;
/// Configuration schema types.
pub mod config;
/// Error types shared across the core.
pub mod error;
/// Order and fill types.
pub mod order;
/// Position state types.
pub mod position;
/// Backtest report types.
pub mod report;
/// Epoch-nanosecond timestamp helpers.
pub mod time;

// Re-export main types for convenience
pub use bar::Bar;
pub use config::{BacktestConfig, ExecutionMode};
pub use error::CoreError;
pub use order::{Fill, Order, OrderQuantity, OrderSide, LOT_SIZE};
pub use position::Position;
pub use report::{BacktestReport, EquityPoint, Stats};
pub use time::{day_of, parse_datetime_ns, DateBoundary, NS_PER_DAY};
