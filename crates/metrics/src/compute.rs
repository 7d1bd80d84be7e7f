//! Terminal statistics computation.

use ashare_types::{EquityPoint, Fill, OrderSide, Stats};

use crate::equity_metrics::{annualized_return, bar_returns, compute_drawdown, sharpe_ratio};
use crate::trade_metrics::{pair_round_trips, win_loss_stats};

/// Sharpe annualization fallback when the bar period is unknown.
const DEFAULT_SHARPE_SCALE: f64 = 252.0;

/// Computes the summary statistics for a completed run.
///
/// The equity series is treated as `[initial_cash] ++ curve`, so the first
/// recorded bar already contributes a return. `scale` is bars per year;
/// without it the annualized return is unavailable and Sharpe falls back
/// to the daily factor.
#[must_use]
pub fn compute_stats(
    initial_cash: f64,
    equity_curve: &[EquityPoint],
    benchmark_curve: &[EquityPoint],
    fills: &[Fill],
    scale: Option<f64>,
) -> Stats {
    let mut stats = Stats::default();
    let Some(last) = equity_curve.last() else {
        return stats;
    };

    if initial_cash > 0.0 {
        stats.total_return = last.equity / initial_cash - 1.0;
    }
    stats.annualized_return = scale
        .and_then(|s| annualized_return(initial_cash, last.equity, equity_curve.len(), s));

    let (max_dd, dd_start, dd_end) = compute_drawdown(equity_curve);
    stats.max_drawdown = max_dd;
    stats.max_drawdown_start = dd_start;
    stats.max_drawdown_end = dd_end;

    let returns = bar_returns(initial_cash, equity_curve);
    stats.sharpe_ratio = sharpe_ratio(&returns, scale.unwrap_or(DEFAULT_SHARPE_SCALE));

    let trips = pair_round_trips(fills);
    let (win_rate, profit_loss_ratio) = win_loss_stats(&trips);
    stats.win_rate = win_rate;
    stats.profit_loss_ratio = profit_loss_ratio;
    stats.open_count = fills.iter().filter(|f| f.side == OrderSide::Buy).count();
    stats.close_count = fills.iter().filter(|f| f.side == OrderSide::Sell).count();

    if let (Some(first), Some(last)) = (benchmark_curve.first(), benchmark_curve.last()) {
        if first.equity > 0.0 {
            stats.benchmark_return = Some(last.equity / first.equity - 1.0);
            stats.benchmark_annualized_return = scale.and_then(|s| {
                annualized_return(first.equity, last.equity, benchmark_curve.len(), s)
            });
            let (bench_dd, _, _) = compute_drawdown(benchmark_curve);
            stats.benchmark_max_drawdown = Some(bench_dd);
        }
    }

    stats
}
