//! The account ledger.

use std::collections::{BTreeMap, BTreeSet};

use ashare_types::{Fill, Position, LOT_SIZE};

use crate::error::PortfolioError;
use crate::settlement::{age_lots, locked_total, SettlementLot};

const CASH_EPS: f64 = 1e-6;

/// Authoritative mutable account state for one backtest.
///
/// Positions and settlement lots are keyed in `BTreeMap`s so every view a
/// strategy or report can observe iterates in sorted symbol order.
#[derive(Debug)]
pub struct PortfolioState {
    cash: f64,
    initial_cash: f64,
    positions: BTreeMap<String, Position>,
    lots: BTreeMap<String, Vec<SettlementLot>>,
    fills: Vec<Fill>,
    t0_symbols: BTreeSet<String>,
}

impl PortfolioState {
    /// Creates a ledger holding `initial_cash` and the configured T+0 set.
    #[must_use]
    pub fn new(initial_cash: f64, t0_symbols: impl IntoIterator<Item = String>) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            positions: BTreeMap::new(),
            lots: BTreeMap::new(),
            fills: Vec::new(),
            t0_symbols: t0_symbols.into_iter().collect(),
        }
    }

    /// Current cash balance.
    #[must_use]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Cash the run started with.
    #[must_use]
    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// All open positions, sorted by symbol.
    #[must_use]
    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    /// The position in `symbol`, if any.
    #[must_use]
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Shares of `symbol` sellable right now.
    #[must_use]
    pub fn available(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).map_or(0, |p| p.available)
    }

    /// Every fill committed so far, in execution order.
    #[must_use]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Consumes the ledger, returning the fill log.
    #[must_use]
    pub fn into_fills(self) -> Vec<Fill> {
        self.fills
    }

    /// Whether `symbol` settles T+0.
    #[must_use]
    pub fn is_t0(&self, symbol: &str) -> bool {
        self.t0_symbols.contains(symbol)
    }

    /// Total account value: cash plus positions marked at `prices`, falling
    /// back to each position's last seen price across suspended bars.
    #[must_use]
    pub fn equity_at(&self, prices: &BTreeMap<&str, f64>) -> f64 {
        let positions_value: f64 = self
            .positions
            .iter()
            .map(|(symbol, pos)| {
                let price = prices.get(symbol.as_str()).copied().unwrap_or(pos.last_price);
                pos.market_value(price)
            })
            .sum();
        self.cash + positions_value
    }

    /// Refreshes each position's `last_price` from the bars present this
    /// step, so suspended symbols keep their most recent valuation.
    pub fn mark_prices(&mut self, prices: &BTreeMap<&str, f64>) {
        for (symbol, pos) in &mut self.positions {
            if let Some(price) = prices.get(symbol.as_str()) {
                pos.last_price = *price;
            }
        }
    }

    /// Commits a buy fill: debits cash, re-averages cost with the
    /// commission amortized in, and records the settlement lot.
    ///
    /// # Errors
    /// - [`PortfolioError::LotMisaligned`] for a non-lot share count.
    /// - [`PortfolioError::NegativeCash`] when the debit would overdraw;
    ///   the execution engine checks affordability first, so this is an
    ///   engine bug surfacing.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply_buy(&mut self, fill: &Fill, trade_day: i64) -> Result<(), PortfolioError> {
        if fill.shares == 0 || fill.shares % LOT_SIZE != 0 {
            return Err(PortfolioError::LotMisaligned {
                symbol: fill.symbol.clone(),
                shares: fill.shares,
            });
        }

        let required = fill.gross_amount + fill.commission;
        if self.cash - required < -CASH_EPS {
            return Err(PortfolioError::NegativeCash {
                cash: self.cash,
                required,
            });
        }
        self.cash -= required;

        let t0 = self.t0_symbols.contains(&fill.symbol);
        let pos = self
            .positions
            .entry(fill.symbol.clone())
            .or_insert_with(|| Position::new(fill.symbol.clone()));

        let old_cost = pos.shares as f64 * pos.avg_cost;
        let new_shares = pos.shares + fill.shares;
        pos.avg_cost = (old_cost + fill.gross_amount + fill.commission) / new_shares as f64;
        pos.shares = new_shares;
        pos.last_price = fill.price;
        if t0 {
            pos.available += fill.shares;
        }

        self.lots.entry(fill.symbol.clone()).or_default().push(SettlementLot {
            day: trade_day,
            shares: fill.shares,
            locks: !t0,
        });

        self.fills.push(fill.clone());
        Ok(())
    }

    /// Commits a sell fill: credits net proceeds and reduces the position,
    /// dropping it entirely at zero shares.
    ///
    /// # Errors
    /// - [`PortfolioError::LotMisaligned`] for a non-lot share count.
    /// - [`PortfolioError::UnknownPosition`] without a position.
    /// - [`PortfolioError::InsufficientAvailable`] beyond the available
    ///   shares; the execution engine clamps first, so this is an engine
    ///   bug surfacing.
    pub fn apply_sell(&mut self, fill: &Fill) -> Result<(), PortfolioError> {
        if fill.shares == 0 || fill.shares % LOT_SIZE != 0 {
            return Err(PortfolioError::LotMisaligned {
                symbol: fill.symbol.clone(),
                shares: fill.shares,
            });
        }

        let pos = self
            .positions
            .get_mut(&fill.symbol)
            .ok_or_else(|| PortfolioError::UnknownPosition(fill.symbol.clone()))?;
        if fill.shares > pos.available {
            return Err(PortfolioError::InsufficientAvailable {
                symbol: fill.symbol.clone(),
                requested: fill.shares,
                available: pos.available,
            });
        }

        self.cash += fill.gross_amount - fill.commission - fill.stamp_tax;
        pos.shares -= fill.shares;
        pos.available -= fill.shares;
        pos.last_price = fill.price;
        if pos.shares == 0 {
            self.positions.remove(&fill.symbol);
        }

        self.fills.push(fill.clone());
        Ok(())
    }

    /// Settlement tick: promotes locked lots older than `new_day` to
    /// available and drops aged entries. A no-op for T+0 lots, which never
    /// locked.
    pub fn roll_day(&mut self, new_day: i64) {
        for (symbol, lots) in &mut self.lots {
            let released = age_lots(lots, new_day);
            if released > 0 {
                if let Some(pos) = self.positions.get_mut(symbol) {
                    pos.available += released;
                }
            }
        }
        self.lots.retain(|_, lots| !lots.is_empty());
    }

    /// Verifies the ledger invariants that must hold between bars.
    ///
    /// # Errors
    /// Returns [`PortfolioError::InvariantViolation`] naming the first
    /// violated condition.
    pub fn validate(&self) -> Result<(), PortfolioError> {
        if self.cash < -CASH_EPS {
            return Err(PortfolioError::InvariantViolation(format!(
                "cash is negative: {:.6}",
                self.cash
            )));
        }
        for (symbol, pos) in &self.positions {
            if !pos.is_lot_aligned() {
                return Err(PortfolioError::InvariantViolation(format!(
                    "{symbol}: {} shares not lot aligned",
                    pos.shares
                )));
            }
            if pos.available > pos.shares {
                return Err(PortfolioError::InvariantViolation(format!(
                    "{symbol}: available {} exceeds held {}",
                    pos.available, pos.shares
                )));
            }
            if pos.avg_cost < 0.0 || (pos.shares > 0 && pos.avg_cost == 0.0) {
                return Err(PortfolioError::InvariantViolation(format!(
                    "{symbol}: avg_cost {} inconsistent with {} shares",
                    pos.avg_cost, pos.shares
                )));
            }
            let locked = self.lots.get(symbol).map_or(0, |lots| locked_total(lots));
            if locked != pos.locked() {
                return Err(PortfolioError::InvariantViolation(format!(
                    "{symbol}: settlement lots lock {} shares, position locks {}",
                    locked,
                    pos.locked()
                )));
            }
        }
        Ok(())
    }
}
