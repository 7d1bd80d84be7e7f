//! # Ashare Data
//!
//! Benchmark timeline and aligned per-symbol bar storage.
//!
//! The benchmark series defines every simulation step; symbol series are
//! aligned to it eagerly, once, before the main loop. After alignment only
//! the cursor moves, so every read during the run is historical by
//! construction.

#![deny(clippy::all)]

pub mod alignment;
pub mod error;
pub mod feed;

pub use alignment::{align_to_timeline, AlignmentOutcome};
pub use error::DataError;
pub use feed::{filter_by_range, DataFeed};
