//! Closed-trade statistics by FIFO pairing of fills.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use ashare_types::{Fill, OrderSide};

/// One closed round trip: a sell matched FIFO against prior buys.
///
/// P/L is net of all fees on both legs — buy commissions through the
/// per-share cost, sell commission and stamp tax through the proceeds.
#[derive(Debug, Clone)]
pub struct RoundTrip {
    /// Instrument traded
    pub symbol: String,
    /// Shares matched in this round trip
    pub shares: u64,
    /// Net profit or loss
    pub pnl: f64,
}

#[derive(Debug, Clone, Copy)]
struct OpenChunk {
    shares: u64,
    cost_per_share: f64,
}

/// Pairs each sell fill FIFO against the open buy chunks of its symbol,
/// producing one round trip per sell.
///
/// Sell shares beyond the recorded buys (impossible under the no-short
/// invariant, but tolerated here) are skipped rather than paired.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pair_round_trips(fills: &[Fill]) -> Vec<RoundTrip> {
    let mut open: BTreeMap<&str, VecDeque<OpenChunk>> = BTreeMap::new();
    let mut trips = Vec::new();

    for fill in fills {
        match fill.side {
            OrderSide::Buy => {
                open.entry(fill.symbol.as_str()).or_default().push_back(OpenChunk {
                    shares: fill.shares,
                    cost_per_share: (fill.gross_amount + fill.commission) / fill.shares as f64,
                });
            }
            OrderSide::Sell => {
                let Some(chunks) = open.get_mut(fill.symbol.as_str()) else {
                    continue;
                };
                let proceeds_per_share =
                    (fill.gross_amount - fill.commission - fill.stamp_tax) / fill.shares as f64;

                let mut remaining = fill.shares;
                let mut matched = 0u64;
                let mut cost = 0.0;
                while remaining > 0 {
                    let Some(front) = chunks.front_mut() else {
                        break;
                    };
                    let used = remaining.min(front.shares);
                    cost += used as f64 * front.cost_per_share;
                    matched += used;
                    remaining -= used;
                    front.shares -= used;
                    if front.shares == 0 {
                        chunks.pop_front();
                    }
                }

                if matched > 0 {
                    trips.push(RoundTrip {
                        symbol: fill.symbol.clone(),
                        shares: matched,
                        pnl: matched as f64 * proceeds_per_share - cost,
                    });
                }
            }
        }
    }

    trips
}

/// Win rate and average-win over average-loss ratio for closed trips.
///
/// A trip with zero P/L counts as a loss. The ratio is infinite with wins
/// and no losses, zero with neither.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn win_loss_stats(trips: &[RoundTrip]) -> (f64, f64) {
    let wins: Vec<f64> = trips.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).collect();
    let losses: Vec<f64> = trips.iter().filter(|t| t.pnl <= 0.0).map(|t| t.pnl.abs()).collect();

    let total = wins.len() + losses.len();
    let win_rate = if total > 0 {
        wins.len() as f64 / total as f64
    } else {
        0.0
    };

    let avg_win = if wins.is_empty() {
        0.0
    } else {
        wins.iter().sum::<f64>() / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        losses.iter().sum::<f64>() / losses.len() as f64
    };

    let profit_loss_ratio = if avg_loss > 0.0 {
        avg_win / avg_loss
    } else if avg_win > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    (win_rate, profit_loss_ratio)
}
