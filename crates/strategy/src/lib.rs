//! # Ashare Strategy
//!
//! The narrow surface user strategy code sees: a [`Strategy`] trait with
//! four optional callbacks and the [`BarContext`] view handed to each.
//!
//! The context borrows every component it exposes for the duration of a
//! single callback; strategies read state, enqueue orders through the
//! [`OrderHelper`], and must not retain the context past their return.

#![deny(clippy::all)]

pub mod context;
pub mod error;
pub mod traits;

pub use context::{BarContext, OrderHelper, PositionView};
pub use error::StrategyError;
pub use traits::Strategy;
