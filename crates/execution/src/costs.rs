//! Trading cost model: slippage, commission, stamp tax.

use ashare_types::{BacktestConfig, Bar, ExecutionMode, OrderSide};

/// All per-order cost parameters, fixed at engine construction.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    /// Proportional commission, both sides
    pub commission_rate: f64,
    /// Commission floor per order
    pub min_commission: f64,
    /// Sell-side stamp tax rate
    pub stamp_tax_rate: f64,
    /// Symmetric slippage in basis points
    pub slippage_bps: f64,
}

impl CostModel {
    /// Builds the model from a validated config.
    #[must_use]
    pub fn from_config(config: &BacktestConfig) -> Self {
        Self {
            commission_rate: config.commission_rate,
            min_commission: config.min_commission,
            stamp_tax_rate: config.stamp_tax_rate,
            slippage_bps: config.slippage_bps,
        }
    }

    /// Fill price: reference adjusted against the order by `slippage_bps`.
    #[must_use]
    pub fn fill_price(&self, side: OrderSide, reference: f64) -> f64 {
        let adjustment = self.slippage_bps / 10_000.0;
        match side {
            OrderSide::Buy => reference * (1.0 + adjustment),
            OrderSide::Sell => reference * (1.0 - adjustment),
        }
    }

    /// Commission on `gross`, floored at `min_commission`.
    #[must_use]
    pub fn commission(&self, gross: f64) -> f64 {
        (gross * self.commission_rate).max(self.min_commission)
    }

    /// Stamp tax on `gross`; zero on buys.
    #[must_use]
    pub fn stamp_tax(&self, side: OrderSide, gross: f64) -> f64 {
        match side {
            OrderSide::Buy => 0.0,
            OrderSide::Sell => gross * self.stamp_tax_rate,
        }
    }
}

/// The bar price anchoring conversion and fills for `mode`.
///
/// VWAP needs `amount` and a positive `volume`; when either is missing the
/// close stands in and the caller is told via the second tuple field.
#[must_use]
pub fn reference_price(bar: &Bar, mode: ExecutionMode) -> (f64, bool) {
    match mode {
        ExecutionMode::Close => (bar.close, false),
        ExecutionMode::Open => (bar.open, false),
        ExecutionMode::Vwap => match bar.vwap() {
            Some(vwap) => (vwap, false),
            None => (bar.close, true),
        },
    }
}
