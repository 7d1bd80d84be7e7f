use thiserror::Error;

use ashare_indicators::IndicatorError;

/// Errors surfaced from strategy callbacks.
///
/// Any error returned by a callback is fatal for the backtest and
/// propagates to the caller with the bar index attached by the engine.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Indicator registration or lookup failed
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    /// Strategy-defined failure
    #[error("{0}")]
    Failed(String),
}

impl StrategyError {
    /// Convenience constructor for strategy-defined failures.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        StrategyError::Failed(message.into())
    }
}
