//! # Ashare Execution
//!
//! Order intake and the sell-then-buy matching pipeline.
//!
//! Orders queue up during the strategy's bar callback and are drained once
//! it returns: sells first so their proceeds fund the buys, enqueue order
//! within each side. Quantity expressions (shares, cash, target weight)
//! convert to whole lots against the bar's reference price; slippage,
//! commission, and stamp tax are applied. Unaffordable or oversized orders
//! are downsized or clamped with a recorded warning; an order that rounds
//! to zero lots is dropped silently.
//!
//! Everything here is deterministic: no randomness, no clock, no
//! hash-ordered iteration visible in the output.

#![deny(clippy::all)]

pub mod costs;
pub mod engine;
pub mod error;
pub mod queue;
pub mod sizing;

pub use costs::CostModel;
pub use engine::{ExecutionEngine, ExecutionReport, OrderWarning};
pub use error::ExecutionError;
pub use queue::OrderQueue;
pub use sizing::{floor_to_lot, target_shares};
