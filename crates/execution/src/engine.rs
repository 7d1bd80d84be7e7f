//! The execution engine: drains the order queue against the current bars
//! and commits fills to the ledger.

use std::collections::BTreeMap;
use std::fmt;

use ashare_portfolio::PortfolioState;
use ashare_types::{BacktestConfig, Bar, ExecutionMode, Fill, Order, OrderSide, LOT_SIZE};

use crate::costs::{reference_price, CostModel};
use crate::error::ExecutionError;
use crate::queue::OrderQueue;
use crate::sizing::target_shares;

const CASH_FIT_EPS: f64 = 1e-9;

/// A non-fatal order rejection or adjustment, kept for the diagnostics sink.
#[derive(Debug, Clone)]
pub struct OrderWarning {
    /// Symbol the order addressed
    pub symbol: String,
    /// What happened to it
    pub message: String,
}

impl fmt::Display for OrderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.message)
    }
}

/// Outcome of one queue drain.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Fills in execution order: every sell, then every buy
    pub fills: Vec<Fill>,
    /// Warnings for clamped, downsized, or dropped orders
    pub warnings: Vec<OrderWarning>,
}

/// Stateless matcher; all run-scoped state lives in the queue and ledger.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionEngine {
    costs: CostModel,
    mode: ExecutionMode,
}

impl ExecutionEngine {
    /// Builds the engine from a validated config.
    #[must_use]
    pub fn new(config: &BacktestConfig) -> Self {
        Self {
            costs: CostModel::from_config(config),
            mode: config.execution_mode,
        }
    }

    /// Drains the queue sells-first and commits each executable order.
    ///
    /// `current_bars` carries this step's present bars; missing or
    /// suspended symbols drop their orders with a warning. Sells clamp to
    /// the available shares; buys shed lots until they fit the cash left
    /// after the sells.
    ///
    /// # Errors
    /// [`ExecutionError::Portfolio`] only when the ledger rejects an order
    /// the pre-trade checks approved, which indicates an engine bug.
    pub fn drain_and_execute(
        &self,
        queue: &mut OrderQueue,
        current_bars: &BTreeMap<&str, &Bar>,
        portfolio: &mut PortfolioState,
        timestamp_ns: i64,
        trade_day: i64,
    ) -> Result<ExecutionReport, ExecutionError> {
        let mut report = ExecutionReport::default();
        let prices: BTreeMap<&str, f64> = current_bars
            .iter()
            .map(|(symbol, bar)| (*symbol, bar.close))
            .collect();

        for order in queue.drain_sorted() {
            self.execute_order(&order, current_bars, &prices, portfolio, timestamp_ns, trade_day, &mut report)?;
        }
        Ok(report)
    }

    #[allow(clippy::too_many_arguments, clippy::cast_precision_loss)]
    fn execute_order(
        &self,
        order: &Order,
        current_bars: &BTreeMap<&str, &Bar>,
        prices: &BTreeMap<&str, f64>,
        portfolio: &mut PortfolioState,
        timestamp_ns: i64,
        trade_day: i64,
        report: &mut ExecutionReport,
    ) -> Result<(), ExecutionError> {
        let symbol = order.symbol.as_str();

        let Some(bar) = current_bars.get(symbol) else {
            warn(report, symbol, "dropped: no bar at this step");
            return Ok(());
        };
        if bar.suspended {
            warn(report, symbol, "dropped: suspended");
            return Ok(());
        }

        let (p_ref, vwap_fallback) = reference_price(bar, self.mode);
        if vwap_fallback {
            warn(report, symbol, "vwap unavailable, using close");
        }

        // Weight sizing values the position on the same close-based map as
        // the equity it is compared against; the reference price only
        // converts the delta into shares.
        let equity = portfolio.equity_at(prices);
        let market_value = portfolio.position(symbol).map_or(0.0, |pos| {
            pos.shares as f64 * prices.get(symbol).copied().unwrap_or(pos.last_price)
        });
        let mut shares = target_shares(order.quantity, order.side, p_ref, equity, market_value);
        if shares == 0 {
            // Sub-lot remainder: dropped without a fill or a warning.
            return Ok(());
        }

        let p_fill = self.costs.fill_price(order.side, p_ref);
        match order.side {
            OrderSide::Sell => {
                let available = portfolio.available(symbol);
                if shares > available {
                    if available == 0 {
                        warn(report, symbol, "dropped: no available shares to sell");
                        return Ok(());
                    }
                    warn(
                        report,
                        symbol,
                        &format!("sell clamped from {shares} to available {available}"),
                    );
                    shares = available;
                }

                let gross = shares as f64 * p_fill;
                let commission = self.costs.commission(gross);
                let stamp_tax = self.costs.stamp_tax(OrderSide::Sell, gross);
                let fill = Fill {
                    symbol: symbol.to_string(),
                    side: OrderSide::Sell,
                    shares,
                    price: p_fill,
                    gross_amount: gross,
                    commission,
                    stamp_tax,
                    net_cash_delta: gross - commission - stamp_tax,
                    timestamp_ns,
                };
                portfolio.apply_sell(&fill)?;
                report.fills.push(fill);
            }
            OrderSide::Buy => {
                let requested = shares;
                let cash = portfolio.cash();
                let mut gross = shares as f64 * p_fill;
                let mut commission = self.costs.commission(gross);
                while shares > 0 && gross + commission > cash + CASH_FIT_EPS {
                    shares -= LOT_SIZE;
                    gross = shares as f64 * p_fill;
                    commission = self.costs.commission(gross);
                }
                if shares == 0 {
                    warn(report, symbol, "dropped: insufficient cash for one lot");
                    return Ok(());
                }
                if shares < requested {
                    warn(
                        report,
                        symbol,
                        &format!("buy downsized from {requested} to {shares} shares to fit cash"),
                    );
                }

                let fill = Fill {
                    symbol: symbol.to_string(),
                    side: OrderSide::Buy,
                    shares,
                    price: p_fill,
                    gross_amount: gross,
                    commission,
                    stamp_tax: 0.0,
                    net_cash_delta: -(gross + commission),
                    timestamp_ns,
                };
                portfolio.apply_buy(&fill, trade_day)?;
                report.fills.push(fill);
            }
        }
        Ok(())
    }
}

fn warn(report: &mut ExecutionReport, symbol: &str, message: &str) {
    tracing::warn!("order for {}: {}", symbol, message);
    report.warnings.push(OrderWarning {
        symbol: symbol.to_string(),
        message: message.to_string(),
    });
}
