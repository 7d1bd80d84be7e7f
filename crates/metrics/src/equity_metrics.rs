//! Helpers for equity-curve derived metrics.

use ashare_types::EquityPoint;

/// Maximum peak-to-trough drawdown and its window timestamps.
///
/// The start timestamp is the peak preceding the deepest trough, the end
/// the trough itself; both are `None` while the curve never draws down.
#[must_use]
pub fn compute_drawdown(curve: &[EquityPoint]) -> (f64, Option<i64>, Option<i64>) {
    let Some(first) = curve.first() else {
        return (0.0, None, None);
    };

    let mut peak = first.equity;
    let mut peak_ts = first.timestamp_ns;
    let mut max_dd = 0.0;
    let mut window: Option<(i64, i64)> = None;

    for point in curve {
        if point.equity > peak {
            peak = point.equity;
            peak_ts = point.timestamp_ns;
        } else if peak > 0.0 {
            let drawdown = (peak - point.equity) / peak;
            if drawdown > max_dd {
                max_dd = drawdown;
                window = Some((peak_ts, point.timestamp_ns));
            }
        }
    }

    let (start, end) = window.map_or((None, None), |(s, e)| (Some(s), Some(e)));
    (max_dd, start, end)
}

/// Per-bar simple returns of `[initial] ++ curve`.
#[must_use]
pub fn bar_returns(initial: f64, curve: &[EquityPoint]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(curve.len());
    let mut prev = initial;
    for point in curve {
        if prev > 0.0 {
            returns.push(point.equity / prev - 1.0);
        }
        prev = point.equity;
    }
    returns
}

/// Annualized Sharpe ratio over per-bar returns; zero when degenerate.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sharpe_ratio(returns: &[f64], annualization_scale: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stdev = variance.sqrt();
    if stdev == 0.0 {
        return 0.0;
    }
    (mean / stdev) * annualization_scale.sqrt()
}

/// Geometric annualization of the whole-run return over `n_bars` bars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn annualized_return(initial: f64, last: f64, n_bars: usize, scale: f64) -> Option<f64> {
    if initial <= 0.0 || last <= 0.0 || n_bars == 0 {
        return None;
    }
    Some((last / initial).powf(scale / n_bars as f64) - 1.0)
}
