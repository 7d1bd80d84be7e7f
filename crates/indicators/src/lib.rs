//! # Ashare Indicators
//!
//! Indicator registration, dense precomputation over the benchmark
//! timeline, and cursor-guarded historical reads.
//!
//! Every registered indicator is computed for every symbol before the main
//! loop starts; during the loop only the cursor moves, and reads can never
//! observe a value beyond it. A missing slot stays `NaN` whether the symbol
//! had no bar, the lookback was unsatisfied, or a user function declined to
//! produce a value.

#![deny(clippy::all)]

pub mod def;
pub mod engine;
pub mod error;
pub mod impl_;

pub use def::{BuiltinIndicator, Field, IndicatorDef, UserIndicatorFn};
pub use engine::IndicatorEngine;
pub use error::IndicatorError;
