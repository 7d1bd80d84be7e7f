//! Event loop driver.

use ashare_strategy::Strategy;

use crate::engine::BacktestEngine;
use crate::error::BacktestError;

/// Runs the main backtest event loop.
///
/// # Errors
/// Propagates the first fatal error from any bar.
pub fn run_event_loop(
    engine: &mut BacktestEngine,
    strategy: &mut dyn Strategy,
) -> Result<(), BacktestError> {
    tracing::info!("Starting backtest: {} bars", engine.bar_count());

    while engine.advance() {
        engine.process_bar(strategy)?;
    }

    tracing::info!("Backtest finished");
    Ok(())
}
