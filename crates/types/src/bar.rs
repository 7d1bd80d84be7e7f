/// One OHLCV bar on the benchmark timeline.
/// `timestamp_ns` is the bar open time in UTC epoch nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    /// Unix epoch nanoseconds UTC (open time)
    pub timestamp_ns: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume in shares
    pub volume: f64,
    /// Turnover amount in account currency, when the source carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Suspension flag; a suspended bar is present but not tradable
    #[serde(default)]
    pub suspended: bool,
}

impl Bar {
    /// Volume-weighted average price, when `amount` and `volume` allow it.
    #[must_use]
    pub fn vwap(&self) -> Option<f64> {
        match self.amount {
            Some(amount) if self.volume > 0.0 => Some(amount / self.volume),
            _ => None,
        }
    }
}
