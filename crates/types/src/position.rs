//! Position state types.

use serde::{Deserialize, Serialize};

use crate::order::LOT_SIZE;

/// Holdings in a single instrument.
///
/// `shares` is always a non-negative multiple of [`LOT_SIZE`], and
/// `available <= shares`; the locked remainder is held by the settlement
/// lots until the next day roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument identifier
    pub symbol: String,
    /// Total shares held
    pub shares: u64,
    /// Shares sellable today (T+1 locking already subtracted)
    pub available: u64,
    /// Average cost per share, commission amortized in
    pub avg_cost: f64,
    /// Most recent close observed for the symbol; values the position
    /// across suspended bars
    pub last_price: f64,
}

impl Position {
    /// Creates an empty position for `symbol`.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            shares: 0,
            available: 0,
            avg_cost: 0.0,
            last_price: 0.0,
        }
    }

    /// Market value at `price`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    /// Shares currently locked by the settlement rule.
    #[must_use]
    pub fn locked(&self) -> u64 {
        self.shares - self.available
    }

    /// Whether the share count is lot aligned.
    #[must_use]
    pub fn is_lot_aligned(&self) -> bool {
        self.shares % LOT_SIZE == 0
    }
}
