//! The per-bar context and order helper.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use ashare_data::DataFeed;
use ashare_execution::OrderQueue;
use ashare_indicators::{IndicatorDef, IndicatorEngine};
use ashare_portfolio::PortfolioState;
use ashare_types::{Bar, OrderQuantity, OrderSide, LOT_SIZE};
use serde_json::Value;

use crate::error::StrategyError;

/// Read-only snapshot of one holding, as the strategy sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    /// Total shares held
    pub shares: u64,
    /// Shares sellable this bar
    pub available: u64,
    /// Average cost per share
    pub avg_cost: f64,
    /// Value at the current (or last seen) price
    pub market_value: f64,
    /// Share of total equity
    pub weight: f64,
}

/// The view object handed to every strategy callback.
///
/// Borrows the engine's components for the duration of one callback; the
/// strategy reads bars, indicators, and portfolio state through it and
/// enqueues orders via [`BarContext::order`]. Mutability is confined to
/// the order queue, the scratch map, and (during `on_start`) indicator
/// registration.
pub struct BarContext<'a> {
    index: usize,
    timestamp_ns: i64,
    period: Option<&'a str>,
    feed: &'a DataFeed,
    indicators: &'a RefCell<IndicatorEngine>,
    portfolio: &'a PortfolioState,
    queue: &'a RefCell<OrderQueue>,
    vars: &'a RefCell<HashMap<String, Value>>,
    prices: BTreeMap<&'a str, f64>,
    equity: f64,
}

impl<'a> BarContext<'a> {
    /// Builds the context for the feed's current step.
    #[must_use]
    pub fn new(
        feed: &'a DataFeed,
        indicators: &'a RefCell<IndicatorEngine>,
        portfolio: &'a PortfolioState,
        queue: &'a RefCell<OrderQueue>,
        vars: &'a RefCell<HashMap<String, Value>>,
        period: Option<&'a str>,
    ) -> Self {
        let prices: BTreeMap<&str, f64> = feed
            .current_bars()
            .into_iter()
            .map(|(symbol, bar)| (symbol, bar.close))
            .collect();
        let equity = portfolio.equity_at(&prices);
        let timestamp_ns = feed
            .current_timestamp()
            .or_else(|| feed.timeline().last().copied())
            .unwrap_or(0);

        Self {
            index: feed.current_index(),
            timestamp_ns,
            period,
            feed,
            indicators,
            portfolio,
            queue,
            vars,
            prices,
            equity,
        }
    }

    /// Benchmark index of this bar.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Timestamp of this bar.
    #[must_use]
    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }

    /// Configured bar period label, when known.
    #[must_use]
    pub fn period(&self) -> Option<&str> {
        self.period
    }

    /// Every symbol the feed knows, sorted.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.feed.symbols().collect()
    }

    /// Cash balance.
    #[must_use]
    pub fn cash(&self) -> f64 {
        self.portfolio.cash()
    }

    /// Total account value at this bar's prices.
    #[must_use]
    pub fn equity(&self) -> f64 {
        self.equity
    }

    /// The symbol's bar at this step, if present.
    #[must_use]
    pub fn bar(&self, symbol: &str) -> Option<&Bar> {
        self.feed.current_bar(symbol)
    }

    /// Up to `count` most recent bars for `symbol`, oldest first.
    #[must_use]
    pub fn bars(&self, symbol: &str, count: usize) -> Vec<&Bar> {
        self.feed.get_bars(symbol, count)
    }

    /// Whether `symbol` can trade this bar.
    #[must_use]
    pub fn is_tradable(&self, symbol: &str) -> bool {
        self.feed.is_tradable(symbol)
    }

    /// View of the position in `symbol`, if held.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self, symbol: &str) -> Option<PositionView> {
        let pos = self.portfolio.position(symbol)?;
        let price = self.price_of(symbol).unwrap_or(pos.last_price);
        let market_value = pos.market_value(price);
        let weight = if self.equity > 0.0 {
            market_value / self.equity
        } else {
            0.0
        };
        Some(PositionView {
            shares: pos.shares,
            available: pos.available,
            avg_cost: pos.avg_cost,
            market_value,
            weight,
        })
    }

    /// Views of every held position, sorted by symbol.
    #[must_use]
    pub fn positions(&self) -> BTreeMap<String, PositionView> {
        self.portfolio
            .positions()
            .keys()
            .filter_map(|symbol| {
                self.position(symbol).map(|view| (symbol.clone(), view))
            })
            .collect()
    }

    /// Registers an indicator; valid only during `on_start`, before the
    /// engine precomputes.
    ///
    /// # Errors
    /// Propagates duplicate-name and registration-closed errors.
    pub fn register_indicator(
        &self,
        name: impl Into<String>,
        def: IndicatorDef,
    ) -> Result<(), StrategyError> {
        self.indicators.borrow_mut().register(name, def)?;
        Ok(())
    }

    /// Indicator value at this bar, `None` when missing.
    #[must_use]
    pub fn indicator(&self, name: &str, symbol: &str) -> Option<f64> {
        self.indicators.borrow().value(name, symbol)
    }

    /// The most recent `count` indicator values up to this bar, oldest
    /// first, missing slots as `NaN`.
    #[must_use]
    pub fn indicator_history(&self, name: &str, symbol: &str, count: usize) -> Vec<f64> {
        self.indicators.borrow().history(name, symbol, count).to_vec()
    }

    /// Reads a scratch variable persisted across bars.
    #[must_use]
    pub fn var(&self, key: &str) -> Option<Value> {
        self.vars.borrow().get(key).cloned()
    }

    /// Writes a scratch variable persisted across bars.
    pub fn set_var(&self, key: impl Into<String>, value: Value) {
        self.vars.borrow_mut().insert(key.into(), value);
    }

    /// The order helper enqueuing into this bar's queue.
    #[must_use]
    pub fn order(&self) -> OrderHelper<'_> {
        OrderHelper { ctx: self }
    }

    fn price_of(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied().or_else(|| {
            self.portfolio.position(symbol).map(|pos| pos.last_price)
        })
    }
}

/// Stateless wrapper enqueuing orders for end-of-bar execution.
///
/// Orders are not executed at enqueue time; the engine drains the queue
/// after the bar callback returns, sells before buys.
pub struct OrderHelper<'a> {
    ctx: &'a BarContext<'a>,
}

impl OrderHelper<'_> {
    /// Enqueues a buy.
    pub fn buy(&self, symbol: impl Into<String>, quantity: OrderQuantity) {
        self.ctx.queue.borrow_mut().push(symbol, OrderSide::Buy, quantity);
    }

    /// Enqueues a sell.
    pub fn sell(&self, symbol: impl Into<String>, quantity: OrderQuantity) {
        self.ctx.queue.borrow_mut().push(symbol, OrderSide::Sell, quantity);
    }

    /// Expands target weights into one order per symbol.
    ///
    /// A symbol already within one lot's worth of its target is skipped,
    /// so repeating the same targets without a price change enqueues
    /// nothing the second time.
    #[allow(clippy::cast_precision_loss)]
    pub fn target(&self, weights: &BTreeMap<String, f64>) {
        for (symbol, &weight) in weights {
            self.target_one(symbol.clone(), weight);
        }
    }

    /// Moves a single symbol toward `weight`.
    #[allow(clippy::cast_precision_loss)]
    pub fn target_one(&self, symbol: impl Into<String>, weight: f64) {
        let symbol = symbol.into();
        let equity = self.ctx.equity();
        let current_value = self
            .ctx
            .position(&symbol)
            .map_or(0.0, |view| view.market_value);
        let current_weight = if equity > 0.0 { current_value / equity } else { 0.0 };

        if let Some(price) = self.ctx.price_of(&symbol) {
            let delta_value = (weight - current_weight) * equity;
            if delta_value.abs() < price * LOT_SIZE as f64 {
                return;
            }
        }

        if weight > current_weight {
            self.buy(symbol, OrderQuantity::Weight(weight));
        } else if weight < current_weight {
            self.sell(symbol, OrderQuantity::Weight(weight));
        }
    }
}
