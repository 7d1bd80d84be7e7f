//! Backtest error types.

use thiserror::Error;

use ashare_data::DataError;
use ashare_execution::ExecutionError;
use ashare_indicators::IndicatorError;
use ashare_portfolio::PortfolioError;
use ashare_strategy::StrategyError;
use ashare_types::CoreError;

/// Errors that can occur during backtest orchestration.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Config validation error
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Data loading or alignment error
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Indicator registration or computation error
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    /// Execution engine error
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Portfolio ledger error
    #[error("portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    /// A strategy callback failed; the bar index locates it
    #[error("strategy {callback} failed at bar {bar_index}: {source}")]
    StrategyCallback {
        /// Which callback raised
        callback: &'static str,
        /// Benchmark index of the bar being processed
        bar_index: usize,
        /// The underlying failure
        source: StrategyError,
    },
}

impl From<CoreError> for BacktestError {
    fn from(err: CoreError) -> Self {
        BacktestError::ConfigValidation(err.to_string())
    }
}

impl BacktestError {
    /// True for errors raised before the loop started.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, BacktestError::ConfigValidation(_))
    }
}
