//! # Ashare Portfolio
//!
//! The authoritative account ledger: cash, positions, per-symbol settlement
//! lots implementing the T+1 rule, and the fill log.
//!
//! Only the execution engine mutates the ledger through `apply_buy` and
//! `apply_sell`; the main loop drives settlement through `roll_day`.
//! Everything else is read access.

#![deny(clippy::all)]

pub mod error;
pub mod portfolio;
pub mod settlement;

pub use error::PortfolioError;
pub use portfolio::PortfolioState;
pub use settlement::SettlementLot;
