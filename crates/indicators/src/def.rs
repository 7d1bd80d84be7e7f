//! Indicator definitions.

use std::fmt;

use ashare_types::Bar;

/// Which bar field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    /// Open price
    Open,
    /// High price
    High,
    /// Low price
    Low,
    /// Close price (default)
    #[default]
    Close,
    /// Volume
    Volume,
}

impl Field {
    /// Extracts this field from a bar.
    #[must_use]
    pub fn extract(self, bar: &Bar) -> f64 {
        match self {
            Field::Open => bar.open,
            Field::High => bar.high,
            Field::Low => bar.low,
            Field::Close => bar.close,
            Field::Volume => bar.volume,
        }
    }
}

/// Builtin indicator descriptors, each computed in a single O(T) pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinIndicator {
    /// Simple moving average over `period` bars of `field`.
    Sma {
        /// Window length
        period: usize,
        /// Bar field to average
        field: Field,
    },
    /// Exponential moving average (span semantics, alpha = 2/(period+1)).
    Ema {
        /// Span length
        period: usize,
        /// Bar field to smooth
        field: Field,
    },
    /// Relative strength index with Wilder smoothing.
    Rsi {
        /// Smoothing period
        period: usize,
        /// Bar field to difference
        field: Field,
    },
}

impl BuiltinIndicator {
    /// Bars needed before the first defined value.
    #[must_use]
    pub fn lookback(&self) -> usize {
        match self {
            BuiltinIndicator::Sma { period, .. } | BuiltinIndicator::Ema { period, .. } => *period,
            BuiltinIndicator::Rsi { period, .. } => period + 1,
        }
    }
}

/// User indicator callback.
///
/// Receives the present-bar historical window ending at the current index,
/// oldest first. Returns `Ok(None)` to mark the slot missing; an `Err`
/// aborts the backtest with the bar index and symbol attached.
pub type UserIndicatorFn = Box<dyn Fn(&[Bar]) -> Result<Option<f64>, String> + Send + Sync>;

/// A registered indicator: a builtin descriptor or a user callable with a
/// declared lookback.
pub enum IndicatorDef {
    /// Builtin, dispatched in `precompute`.
    Builtin(BuiltinIndicator),
    /// User-supplied function.
    Callable {
        /// The callback
        func: UserIndicatorFn,
        /// Window length handed to the callback
        lookback: usize,
    },
}

impl IndicatorDef {
    /// Lookback in bars for this definition.
    #[must_use]
    pub fn lookback(&self) -> usize {
        match self {
            IndicatorDef::Builtin(builtin) => builtin.lookback(),
            IndicatorDef::Callable { lookback, .. } => *lookback,
        }
    }
}

impl fmt::Debug for IndicatorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorDef::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            IndicatorDef::Callable { lookback, .. } => f
                .debug_struct("Callable")
                .field("lookback", lookback)
                .finish(),
        }
    }
}
