use thiserror::Error;

use ashare_portfolio::PortfolioError;

/// Errors escaping the execution engine.
///
/// Pre-trade checks clamp or drop anything a ledger commit could reject, so
/// a portfolio error here means the engine's own accounting disagrees with
/// the ledger.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("ledger rejected a pre-checked order: {0}")]
    Portfolio(#[from] PortfolioError),
}
