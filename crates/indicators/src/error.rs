use thiserror::Error;

/// Errors raised during indicator registration and computation.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Duplicate indicator name: {0}")]
    DuplicateName(String),

    #[error("Registration closed: '{0}' registered after precompute")]
    RegistrationClosed(String),

    #[error("precompute called twice")]
    AlreadyComputed,

    #[error("Invalid params for {name}: {reason}")]
    InvalidParams { name: String, reason: String },

    #[error("User indicator '{name}' failed for {symbol} at bar {index}: {message}")]
    UserFunction {
        name: String,
        symbol: String,
        index: usize,
        message: String,
    },
}
