//! Backtest engine orchestration.

use std::cell::RefCell;
use std::collections::HashMap;

use ashare_data::{filter_by_range, DataFeed};
use ashare_execution::{ExecutionEngine, OrderQueue};
use ashare_indicators::IndicatorEngine;
use ashare_metrics::MetricsRecorder;
use ashare_portfolio::PortfolioState;
use ashare_strategy::{BarContext, Strategy, StrategyError};
use ashare_types::{
    day_of, parse_datetime_ns, BacktestConfig, BacktestReport, Bar, DateBoundary,
};
use serde_json::Value;

use crate::error::BacktestError;
use crate::event_loop;
use crate::result_builder;

/// Owns every component of one backtest and drives the per-bar sequence.
///
/// Construction validates the config; `set_benchmark` and
/// `add_market_data` ingest (and clip) the input series; `run` executes
/// the strategy against them and assembles the report. Shared mutable
/// components live behind `RefCell`s so the per-bar context can borrow
/// them without owning anything.
pub struct BacktestEngine {
    config: BacktestConfig,
    start_ns: Option<i64>,
    end_ns: Option<i64>,
    feed: DataFeed,
    indicators: RefCell<IndicatorEngine>,
    execution: ExecutionEngine,
    portfolio: PortfolioState,
    metrics: MetricsRecorder,
    queue: RefCell<OrderQueue>,
    vars: RefCell<HashMap<String, Value>>,
    warnings: Vec<String>,
    prev_day: Option<i64>,
}

impl BacktestEngine {
    /// Creates an engine from a config.
    ///
    /// # Errors
    /// [`BacktestError::ConfigValidation`] for negative rates, an
    /// unparseable `start`/`end`, or `start` after `end`.
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;

        let start_ns = config
            .start
            .as_deref()
            .map(|s| parse_datetime_ns(s, DateBoundary::Start))
            .transpose()?;
        let end_ns = config
            .end
            .as_deref()
            .map(|s| parse_datetime_ns(s, DateBoundary::End))
            .transpose()?;
        if let (Some(start), Some(end)) = (start_ns, end_ns) {
            if start > end {
                return Err(BacktestError::ConfigValidation(
                    "start must not be after end".to_string(),
                ));
            }
        }

        let execution = ExecutionEngine::new(&config);
        let portfolio = PortfolioState::new(config.cash, config.t0_symbols.clone());

        Ok(Self {
            config,
            start_ns,
            end_ns,
            feed: DataFeed::new(),
            indicators: RefCell::new(IndicatorEngine::new()),
            execution,
            portfolio,
            metrics: MetricsRecorder::new(),
            queue: RefCell::new(OrderQueue::new()),
            vars: RefCell::new(HashMap::new()),
            warnings: Vec::new(),
            prev_day: None,
        })
    }

    /// Installs the benchmark series, clipped to the configured range.
    ///
    /// # Errors
    /// Propagates empty or non-monotonic benchmark errors.
    pub fn set_benchmark(&mut self, bars: Vec<Bar>) -> Result<(), BacktestError> {
        let clipped = filter_by_range(bars, self.start_ns, self.end_ns);
        self.feed.set_benchmark(clipped)?;
        Ok(())
    }

    /// Adds a symbol's bars, clipped and aligned to the benchmark.
    ///
    /// # Errors
    /// Propagates the benchmark-not-set error.
    pub fn add_market_data(
        &mut self,
        symbol: impl Into<String>,
        bars: Vec<Bar>,
    ) -> Result<(), BacktestError> {
        let clipped = filter_by_range(bars, self.start_ns, self.end_ns);
        self.feed.add_market_data(symbol, clipped)?;
        Ok(())
    }

    /// Runs the full backtest: start callback, indicator precompute, the
    /// event loop, stop callback, invariant validation, report assembly.
    ///
    /// # Errors
    /// Any fatal error from configuration, a strategy callback (with the
    /// bar index attached), or an engine invariant violation.
    pub fn run(mut self, strategy: &mut dyn Strategy) -> Result<BacktestReport, BacktestError> {
        if self.feed.is_empty() {
            return Err(BacktestError::Data(ashare_data::DataError::BenchmarkNotSet));
        }

        self.with_context(|ctx| strategy.on_start(ctx))
            .map_err(|source| self.callback_error("on_start", source))?;

        self.indicators.borrow_mut().precompute(&self.feed)?;

        event_loop::run_event_loop(&mut self, strategy)?;

        self.with_context(|ctx| strategy.on_stop(ctx))
            .map_err(|source| self.callback_error("on_stop", source))?;

        self.portfolio.validate()?;

        if self.feed.dropped_bars() > 0 {
            self.warnings.insert(
                0,
                format!(
                    "alignment dropped {} bars outside the benchmark timeline",
                    self.feed.dropped_bars()
                ),
            );
        }

        let scale = self.config.annualization_scale();
        let stats = self.metrics.finalize(self.config.cash, scale);
        Ok(result_builder::build_report(
            stats,
            self.metrics,
            self.warnings,
        ))
    }

    pub(crate) fn bar_count(&self) -> usize {
        self.feed.len()
    }

    pub(crate) fn advance(&mut self) -> bool {
        self.feed.advance()
    }

    /// One full step of the fixed per-bar sequence; the feed has already
    /// advanced to the bar being processed.
    pub(crate) fn process_bar(&mut self, strategy: &mut dyn Strategy) -> Result<(), BacktestError> {
        let index = self.feed.current_index();
        let Some(timestamp_ns) = self.feed.current_timestamp() else {
            return Ok(());
        };

        let day = day_of(timestamp_ns);
        if self.prev_day != Some(day) {
            self.portfolio.roll_day(day);
            self.prev_day = Some(day);
        }

        self.indicators.borrow_mut().set_cursor(index);

        self.with_context(|ctx| strategy.on_bar(ctx))
            .map_err(|source| self.callback_error("on_bar", source))?;

        let report = {
            let current_bars = self.feed.current_bars();
            self.execution.drain_and_execute(
                &mut self.queue.borrow_mut(),
                &current_bars,
                &mut self.portfolio,
                timestamp_ns,
                day,
            )?
        };
        self.warnings.extend(report.warnings.iter().map(ToString::to_string));

        if !report.fills.is_empty() {
            let result = {
                let ctx = self.context();
                report
                    .fills
                    .iter()
                    .try_for_each(|fill| strategy.on_trade(fill, &ctx))
            };
            result.map_err(|source| self.callback_error("on_trade", source))?;
        }
        self.metrics.record_fills(&report.fills);

        let prices = self
            .feed
            .current_bars()
            .into_iter()
            .map(|(symbol, bar)| (symbol, bar.close))
            .collect();
        self.portfolio.mark_prices(&prices);
        let equity = self.portfolio.equity_at(&prices);
        self.metrics.record_equity(timestamp_ns, equity);

        if let (Some(bar), Some(first)) = (
            self.feed.current_benchmark_bar(),
            self.feed.first_benchmark_bar(),
        ) {
            if first.close > 0.0 {
                self.metrics
                    .record_benchmark(timestamp_ns, self.config.cash * bar.close / first.close);
            }
        }

        Ok(())
    }

    fn context(&self) -> BarContext<'_> {
        BarContext::new(
            &self.feed,
            &self.indicators,
            &self.portfolio,
            &self.queue,
            &self.vars,
            self.config.period.as_deref(),
        )
    }

    fn with_context<F>(&self, f: F) -> Result<(), StrategyError>
    where
        F: FnOnce(&BarContext<'_>) -> Result<(), StrategyError>,
    {
        let ctx = self.context();
        f(&ctx)
    }

    fn callback_error(&self, callback: &'static str, source: StrategyError) -> BacktestError {
        BacktestError::StrategyCallback {
            callback,
            bar_index: self.feed.current_index(),
            source,
        }
    }
}
