//! End-to-end runs through the public `run_backtest` entry point.

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use ashare_backtest::{run_backtest, BacktestError};
use ashare_indicators::{BuiltinIndicator, Field, IndicatorDef};
use ashare_strategy::{BarContext, Strategy, StrategyError};
use ashare_types::{BacktestConfig, Bar, OrderQuantity, OrderSide, NS_PER_DAY};

fn daily_bar(day: i64, close: f64) -> Bar {
    Bar {
        timestamp_ns: day * NS_PER_DAY,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000_000.0,
        amount: None,
        suspended: false,
    }
}

fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(day, &close)| daily_bar(day as i64, close))
        .collect()
}

fn run(
    config: BacktestConfig,
    strategy: &mut dyn Strategy,
    data: &[(&str, Vec<Bar>)],
    benchmark: Vec<Bar>,
) -> ashare_types::BacktestReport {
    let data: BTreeMap<String, Vec<Bar>> = data
        .iter()
        .map(|(symbol, bars)| ((*symbol).to_string(), bars.clone()))
        .collect();
    let mut bench = BTreeMap::new();
    bench.insert("000300.SH".to_string(), benchmark);
    run_backtest(config, strategy, data, bench).unwrap()
}

/// Buys one lot on the first bar, sells everything available afterwards.
struct RoundTrip {
    trades_seen: usize,
}

impl Strategy for RoundTrip {
    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        if ctx.index() == 0 {
            ctx.order().buy("X", OrderQuantity::Shares(100.0));
        } else if let Some(view) = ctx.position("X") {
            if view.available > 0 {
                ctx.order().sell("X", OrderQuantity::Shares(view.available as f64));
            }
        }
        Ok(())
    }

    fn on_trade(
        &mut self,
        _fill: &ashare_types::Fill,
        _ctx: &BarContext<'_>,
    ) -> Result<(), StrategyError> {
        self.trades_seen += 1;
        Ok(())
    }
}

#[test]
fn test_single_lot_t1_round_trip() {
    let bars = daily_bars(&[10.0, 11.0]);
    let mut strategy = RoundTrip { trades_seen: 0 };
    let report = run(
        BacktestConfig::default(),
        &mut strategy,
        &[("X", bars.clone())],
        bars,
    );

    assert_eq!(report.fills.len(), 2);
    assert_eq!(strategy.trades_seen, 2);

    let buy = &report.fills[0];
    assert_eq!(buy.side, OrderSide::Buy);
    assert_eq!(buy.shares, 100);
    assert_relative_eq!(buy.gross_amount, 1_000.0, epsilon = 1e-9);
    assert_relative_eq!(buy.commission, 5.0, epsilon = 1e-9);

    let sell = &report.fills[1];
    assert_eq!(sell.side, OrderSide::Sell);
    assert_relative_eq!(sell.gross_amount, 1_100.0, epsilon = 1e-9);
    assert_relative_eq!(sell.commission, 5.0, epsilon = 1e-9);
    assert_relative_eq!(sell.stamp_tax, 1.1, epsilon = 1e-9);

    // Day 1: cash 94_995 plus 100 shares at 10.00.
    assert_relative_eq!(report.equity_curve[0].equity, 95_995.0, epsilon = 1e-6);
    // Day 2: fully in cash after the sell.
    assert_relative_eq!(report.equity_curve[1].equity, 96_088.9, epsilon = 1e-6);
    assert_relative_eq!(report.stats.total_return, -0.039_111, epsilon = 1e-6);
    assert_eq!(report.stats.open_count, 1);
    assert_eq!(report.stats.close_count, 1);
}

/// Enqueues the buy before the sell; execution must still sell first.
struct SellFundsBuy;

impl Strategy for SellFundsBuy {
    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        if ctx.index() == 0 {
            ctx.order().buy("A", OrderQuantity::Shares(200.0));
        } else if ctx.index() == 1 {
            ctx.order().buy("B", OrderQuantity::Cash(10_000.0));
            ctx.order().sell("A", OrderQuantity::Shares(200.0));
        }
        Ok(())
    }
}

#[test]
fn test_sells_settle_before_buys_within_bar() {
    let bars = daily_bars(&[10.0, 10.0]);
    let config = BacktestConfig {
        cash: 2_100.0,
        ..BacktestConfig::default()
    };
    let report = run(
        config,
        &mut SellFundsBuy,
        &[("A", bars.clone()), ("B", bars.clone())],
        bars,
    );

    // Day 2 produced a sell of A and then a (downsized) buy of B.
    let day2: Vec<_> = report
        .fills
        .iter()
        .filter(|f| f.timestamp_ns == NS_PER_DAY)
        .collect();
    assert_eq!(day2.len(), 2);
    assert_eq!(day2[0].side, OrderSide::Sell);
    assert_eq!(day2[0].symbol, "A");
    assert_eq!(day2[1].side, OrderSide::Buy);
    assert_eq!(day2[1].symbol, "B");
    assert!(day2[1].shares >= 100);
}

/// Rebalances to a 30% target weight once, then holds the target.
struct Rebalance;

impl Strategy for Rebalance {
    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        ctx.order().target_one("X", 0.3);
        Ok(())
    }
}

#[test]
fn test_weight_rebalance_and_idempotence() {
    let bars = daily_bars(&[50.0, 50.0]);
    let report = run(
        BacktestConfig::default(),
        &mut Rebalance,
        &[("X", bars.clone())],
        bars,
    );

    // 0.3 * 100_000 / 50 = 600 shares on day 1; within one lot's worth on
    // day 2, so no second-round fill.
    assert_eq!(report.fills.len(), 1);
    assert_eq!(report.fills[0].shares, 600);
}

/// Tries to flip the position on the buy day; T+1 must block it.
struct SameDayFlip {
    symbol: &'static str,
}

impl Strategy for SameDayFlip {
    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        if ctx.index() == 0 {
            ctx.order().buy(self.symbol, OrderQuantity::Shares(100.0));
            ctx.order().sell(self.symbol, OrderQuantity::Shares(100.0));
        }
        Ok(())
    }
}

#[test]
fn test_t1_blocks_same_day_sell() {
    let bars = daily_bars(&[10.0, 10.0]);
    let report = run(
        BacktestConfig::default(),
        &mut SameDayFlip { symbol: "X" },
        &[("X", bars.clone())],
        bars,
    );

    // Only the buy fills; the sell was dropped with a warning.
    assert_eq!(report.fills.len(), 1);
    assert_eq!(report.fills[0].side, OrderSide::Buy);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("no available shares")));
}

#[test]
fn test_t0_allows_same_day_sell() {
    let bars = daily_bars(&[10.0, 10.0]);
    let config = BacktestConfig {
        t0_symbols: vec!["X".to_string()],
        ..BacktestConfig::default()
    };
    let report = run(
        config,
        &mut SameDayFlip { symbol: "X" },
        &[("X", bars.clone())],
        bars,
    );

    assert_eq!(report.fills.len(), 2);
    assert_eq!(report.fills[1].side, OrderSide::Sell);
}

/// Registers an SMA in `on_start` and checks the guarded reads per bar.
struct SmaProbe {
    observed_at_4: Option<f64>,
    history_len_at_4: usize,
}

impl Strategy for SmaProbe {
    fn on_start(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        ctx.register_indicator(
            "sma3",
            IndicatorDef::Builtin(BuiltinIndicator::Sma {
                period: 3,
                field: Field::Close,
            }),
        )
    }

    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        if ctx.index() == 4 {
            self.observed_at_4 = ctx.indicator("sma3", "X");
            self.history_len_at_4 = ctx.indicator_history("sma3", "X", 10).len();
        }
        Ok(())
    }
}

#[test]
fn test_indicator_reads_are_historical_only() {
    let bars = daily_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    let mut strategy = SmaProbe {
        observed_at_4: None,
        history_len_at_4: 0,
    };
    run(
        BacktestConfig::default(),
        &mut strategy,
        &[("X", bars.clone())],
        bars,
    );

    assert_relative_eq!(strategy.observed_at_4.unwrap(), 4.0, epsilon = 1e-10);
    // Window is clipped at the cursor: 5 slots, never the value at index 5.
    assert_eq!(strategy.history_len_at_4, 5);
}

/// A strategy whose bar callback fails on a chosen index.
struct Exploding {
    at_index: usize,
}

impl Strategy for Exploding {
    fn on_bar(&mut self, ctx: &BarContext<'_>) -> Result<(), StrategyError> {
        if ctx.index() == self.at_index {
            return Err(StrategyError::failed("deliberate failure"));
        }
        Ok(())
    }
}

#[test]
fn test_callback_error_carries_bar_index() {
    let bars = daily_bars(&[10.0, 10.0, 10.0]);
    let data: BTreeMap<String, Vec<Bar>> =
        [("X".to_string(), bars.clone())].into_iter().collect();
    let mut bench = BTreeMap::new();
    bench.insert("000300.SH".to_string(), bars);

    let err = run_backtest(
        BacktestConfig::default(),
        &mut Exploding { at_index: 1 },
        data,
        bench,
    )
    .unwrap_err();

    match err {
        BacktestError::StrategyCallback { callback, bar_index, .. } => {
            assert_eq!(callback, "on_bar");
            assert_eq!(bar_index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_equity_identity_and_benchmark_curve() {
    let closes = [10.0, 10.5, 11.0, 10.8];
    let bars = daily_bars(&closes);
    let mut strategy = RoundTrip { trades_seen: 0 };
    let report = run(
        BacktestConfig::default(),
        &mut strategy,
        &[("X", bars.clone())],
        bars,
    );

    // Benchmark curve is buy-and-hold of the benchmark scaled to cash.
    assert_eq!(report.benchmark_curve.len(), closes.len());
    for (point, close) in report.benchmark_curve.iter().zip(closes.iter()) {
        assert_relative_eq!(point.equity, 100_000.0 * close / 10.0, epsilon = 1e-6);
    }
    assert!(report.stats.benchmark_return.is_some());
    assert_relative_eq!(
        report.stats.benchmark_return.unwrap(),
        0.08,
        epsilon = 1e-9
    );

    // Fee identity: cash change + final position value equals gross P/L
    // minus all fees, which the per-fill net deltas already encode.
    let net_sum: f64 = report.fills.iter().map(|f| f.net_cash_delta).sum();
    let final_equity = report.equity_curve.last().unwrap().equity;
    assert_relative_eq!(final_equity, 100_000.0 + net_sum, epsilon = 1e-6);
}

#[test]
fn test_determinism_bit_for_bit() {
    let bars = daily_bars(&[10.0, 10.5, 11.0, 10.8, 11.2]);
    let run_once = || {
        let mut strategy = Rebalance;
        let report = run(
            BacktestConfig {
                slippage_bps: 5.0,
                period: Some("1d".to_string()),
                ..BacktestConfig::default()
            },
            &mut strategy,
            &[("X", bars.clone())],
            bars.clone(),
        );
        serde_json::to_string(&report).unwrap()
    };
    assert_eq!(run_once(), run_once());
}

#[test]
fn test_start_end_clip_the_timeline() {
    let bars = daily_bars(&[10.0, 11.0, 12.0, 13.0]);
    let config = BacktestConfig {
        start: Some("1970-01-02".to_string()),
        end: Some("1970-01-03".to_string()),
        ..BacktestConfig::default()
    };
    let report = run(config, &mut Rebalance, &[("X", bars.clone())], bars);

    assert_eq!(report.equity_curve.len(), 2);
    assert_eq!(report.equity_curve[0].timestamp_ns, NS_PER_DAY);
}

#[test]
fn test_suspended_bar_drops_orders() {
    let mut bars = daily_bars(&[10.0, 10.0]);
    bars[0].suspended = true;
    let benchmark = daily_bars(&[10.0, 10.0]);

    let report = run(
        BacktestConfig::default(),
        &mut SameDayFlip { symbol: "X" },
        &[("X", bars)],
        benchmark,
    );

    assert!(report.fills.is_empty());
    assert!(report.warnings.iter().any(|w| w.contains("suspended")));
}
