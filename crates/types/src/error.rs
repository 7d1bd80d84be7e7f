use thiserror::Error;

/// Errors raised by the shared core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Datetime string could not be parsed
    #[error("date parse error: {0}")]
    DateParse(String),
}
