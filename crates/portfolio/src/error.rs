use thiserror::Error;

/// Errors raised by ledger mutations and invariant checks.
///
/// The execution engine pre-checks every order, so any of these escaping a
/// run indicates an engine bug rather than bad user input.
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("buy would overdraw cash: have {cash:.4}, need {required:.4}")]
    NegativeCash { cash: f64, required: f64 },

    #[error("sell of {requested} {symbol} exceeds available {available}")]
    InsufficientAvailable {
        symbol: String,
        requested: u64,
        available: u64,
    },

    #[error("no position in {0}")]
    UnknownPosition(String),

    #[error("fill for {symbol} is not lot aligned: {shares} shares")]
    LotMisaligned { symbol: String, shares: u64 },

    #[error("ledger invariant violated: {0}")]
    InvariantViolation(String),
}
