//! Order and fill types.
//!
//! Orders are queued by the strategy during its bar callback and drained by
//! the execution engine after the callback returns. Fills are the committed
//! trade legs.

use serde::{Deserialize, Serialize};

/// The atomic trading unit: one lot is 100 shares.
pub const LOT_SIZE: u64 = 100;

/// Side of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Open or add to a position.
    Buy,
    /// Reduce or close a position.
    Sell,
}

/// How an order's quantity is expressed.
///
/// Conversion to an integral number of lots is a pure function of the tag,
/// the value, the bar's reference price, and (for weights) the current
/// equity and position market value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderQuantity {
    /// A share count, floored to whole lots.
    Shares(f64),
    /// A cash amount to deploy (buy) or liquidate (sell).
    Cash(f64),
    /// A target portfolio weight in `[0, 1]`.
    Weight(f64),
}

/// A queued order awaiting execution at the end of the current bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Instrument identifier
    pub symbol: String,
    /// Buy or sell
    pub side: OrderSide,
    /// Quantity expression
    pub quantity: OrderQuantity,
    /// Intra-bar enqueue counter; ties within a side break by this
    pub seq: u64,
}

/// One executed trade leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Instrument identifier
    pub symbol: String,
    /// Buy or sell
    pub side: OrderSide,
    /// Executed share count, always a multiple of [`LOT_SIZE`]
    pub shares: u64,
    /// Fill price after slippage
    pub price: f64,
    /// `shares * price`
    pub gross_amount: f64,
    /// Commission charged
    pub commission: f64,
    /// Stamp tax charged (sell side only)
    pub stamp_tax: f64,
    /// Signed cash movement: negative for buys, positive for sells
    pub net_cash_delta: f64,
    /// Bar timestamp the fill occurred on
    pub timestamp_ns: i64,
}
