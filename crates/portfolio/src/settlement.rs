//! Settlement lots.
//!
//! Per symbol, a short FIFO of same-day purchases. T+1 entries lock their
//! shares until the next day roll; T+0 entries are audit-only and never
//! lock. Expected length is a handful, so ageing is a linear retain.

/// One recorded purchase awaiting settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementLot {
    /// Civil day the purchase happened on
    pub day: i64,
    /// Shares bought
    pub shares: u64,
    /// Whether the lot locks its shares until the next day roll
    pub locks: bool,
}

/// Sum of shares still locked in `lots`.
#[must_use]
pub fn locked_total(lots: &[SettlementLot]) -> u64 {
    lots.iter().filter(|lot| lot.locks).map(|lot| lot.shares).sum()
}

/// Promotes lots older than `new_day`, returning the share count released
/// from locking. Aged entries (locking or not) are dropped.
pub fn age_lots(lots: &mut Vec<SettlementLot>, new_day: i64) -> u64 {
    let released = lots
        .iter()
        .filter(|lot| lot.locks && lot.day < new_day)
        .map(|lot| lot.shares)
        .sum();
    lots.retain(|lot| lot.day >= new_day);
    released
}
