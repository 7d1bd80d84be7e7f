//! The strategy trait.

use ashare_types::Fill;

use crate::context::BarContext;
use crate::error::StrategyError;

/// A trading strategy: up to four callbacks, each optional.
///
/// Every callback receives the per-bar [`BarContext`] and runs to
/// completion before the loop continues; an `Err` from any of them aborts
/// the backtest. The default implementations are no-ops, so a strategy
/// implements only what it needs.
///
/// # Example
/// ```ignore
/// impl Strategy for DoubleSma {
///     fn on_start(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
///         ctx.register_indicator("fast", sma(5))?;
///         ctx.register_indicator("slow", sma(20))?;
///         Ok(())
///     }
///
///     fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
///         if ctx.indicator("fast", "600519.SH") > ctx.indicator("slow", "600519.SH") {
///             ctx.order().buy("600519.SH", OrderQuantity::Weight(0.9));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Strategy {
    /// Runs once before the loop; the place to register indicators.
    fn on_start(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        let _ = ctx;
        Ok(())
    }

    /// Runs once per bar, before order execution.
    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        let _ = ctx;
        Ok(())
    }

    /// Runs once per fill produced by this bar's execution.
    fn on_trade(&mut self, fill: &Fill, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        let _ = (fill, ctx);
        Ok(())
    }

    /// Runs once after the loop ends.
    fn on_stop(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        let _ = ctx;
        Ok(())
    }
}
