//! Builtin indicator implementations.
//!
//! Each builtin computes over a dense value series in one pass, returning a
//! series of the same length with `NaN` before the warmup is satisfied.

pub mod ema;
pub mod rsi;
pub mod sma;

pub use ema::ema;
pub use rsi::rsi;
pub use sma::sma;
