//! Configuration schema for a backtest run.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which bar price anchors order execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Fill against the bar close (default).
    #[default]
    Close,
    /// Fill against the bar open.
    Open,
    /// Fill against `amount / volume`; falls back to close when the
    /// source carries no turnover amount.
    Vwap,
}

impl FromStr for ExecutionMode {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "close" => Ok(Self::Close),
            "open" => Ok(Self::Open),
            "vwap" => Ok(Self::Vwap),
            other => Err(CoreError::Config(format!(
                "unknown execution_mode '{other}'"
            ))),
        }
    }
}

/// Backtest configuration with A-share market defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Optional inclusive lower bound clipping the benchmark timeline
    pub start: Option<String>,
    /// Optional inclusive upper bound clipping the benchmark timeline
    pub end: Option<String>,
    /// Initial cash balance
    pub cash: f64,
    /// Proportional commission, charged on both sides
    pub commission_rate: f64,
    /// Floor on commission per order
    pub min_commission: f64,
    /// Sell-side stamp tax rate
    pub stamp_tax_rate: f64,
    /// Symmetric slippage in basis points
    pub slippage_bps: f64,
    /// Bar price anchoring order execution
    pub execution_mode: ExecutionMode,
    /// Symbols settled T+0; everything else is T+1
    pub t0_symbols: Vec<String>,
    /// Bar period label (`"1d"`, `"60m"`, ...) driving annualization;
    /// `None` leaves annualized figures unavailable
    pub period: Option<String>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            cash: 100_000.0,
            commission_rate: 5e-4,
            min_commission: 5.0,
            stamp_tax_rate: 1e-3,
            slippage_bps: 0.0,
            execution_mode: ExecutionMode::Close,
            t0_symbols: Vec::new(),
            period: None,
        }
    }
}

/// Trading days per year used for annualization.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Minutes in one A-share trading session.
const SESSION_MINUTES: f64 = 240.0;

impl BacktestConfig {
    /// Checks every numeric field for validity.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let non_negative = [
            ("cash", self.cash),
            ("commission_rate", self.commission_rate),
            ("min_commission", self.min_commission),
            ("stamp_tax_rate", self.stamp_tax_rate),
            ("slippage_bps", self.slippage_bps),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Config(format!("{name} must be >= 0, got {value}")));
            }
        }
        Ok(())
    }

    /// Bars per year implied by the configured `period`, for annualizing
    /// returns and ratios. `None` when the period is absent or unknown.
    #[must_use]
    pub fn annualization_scale(&self) -> Option<f64> {
        let period = self.period.as_deref()?.trim().to_lowercase();
        match period.as_str() {
            "1d" | "d" | "day" | "daily" => Some(TRADING_DAYS_PER_YEAR),
            other => {
                let minutes: f64 = other.strip_suffix('m')?.parse().ok()?;
                if minutes > 0.0 && minutes <= SESSION_MINUTES {
                    Some(TRADING_DAYS_PER_YEAR * (SESSION_MINUTES / minutes))
                } else {
                    None
                }
            }
        }
    }

    /// Whether `symbol` settles T+0.
    #[must_use]
    pub fn is_t0(&self, symbol: &str) -> bool {
        self.t0_symbols.iter().any(|s| s == symbol)
    }
}
