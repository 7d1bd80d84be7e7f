//! The data feed: benchmark timeline, aligned symbol series, and the
//! simulation cursor.

use std::collections::BTreeMap;

use ashare_types::Bar;

use crate::alignment::align_to_timeline;
use crate::error::DataError;

/// Owns every bar series for a run and defines the simulation clock.
///
/// `set_benchmark` must be called before any `add_market_data`; both happen
/// before the main loop, after which the feed is immutable except for the
/// cursor. Symbol series are keyed in a `BTreeMap` so every iteration a
/// strategy can observe is in deterministic (sorted) order.
#[derive(Debug, Default)]
pub struct DataFeed {
    timeline: Vec<i64>,
    benchmark_bars: Vec<Bar>,
    series: BTreeMap<String, Vec<Option<Bar>>>,
    cursor: usize,
    started: bool,
    dropped_bars: usize,
}

impl DataFeed {
    /// Creates an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the benchmark series whose timestamps become the timeline.
    ///
    /// # Errors
    /// - [`DataError::EmptyBenchmark`] for an empty series.
    /// - [`DataError::NonMonotonicBenchmark`] when timestamps are not
    ///   strictly increasing.
    pub fn set_benchmark(&mut self, bars: Vec<Bar>) -> Result<(), DataError> {
        if bars.is_empty() {
            return Err(DataError::EmptyBenchmark);
        }
        for (idx, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp_ns <= pair[0].timestamp_ns {
                return Err(DataError::NonMonotonicBenchmark(idx + 1));
            }
        }

        self.timeline = bars.iter().map(|b| b.timestamp_ns).collect();
        self.benchmark_bars = bars;
        Ok(())
    }

    /// Aligns and stores a symbol's bars against the benchmark timeline.
    ///
    /// Bars with timestamps off the timeline are dropped with a warning.
    ///
    /// # Errors
    /// Returns [`DataError::BenchmarkNotSet`] when called before
    /// [`DataFeed::set_benchmark`].
    pub fn add_market_data(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Result<(), DataError> {
        if self.timeline.is_empty() {
            return Err(DataError::BenchmarkNotSet);
        }

        let symbol = symbol.into();
        let outcome = align_to_timeline(&self.timeline, bars);
        if outcome.dropped > 0 {
            tracing::warn!(
                "{}: dropped {} bars outside the benchmark timeline",
                symbol,
                outcome.dropped
            );
            self.dropped_bars += outcome.dropped;
        }
        self.series.insert(symbol, outcome.slots);
        Ok(())
    }

    /// Number of benchmark steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Whether the feed has no timeline yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// The benchmark timeline.
    #[must_use]
    pub fn timeline(&self) -> &[i64] {
        &self.timeline
    }

    /// All registered symbols, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Total bars dropped during alignment, for the diagnostics sink.
    #[must_use]
    pub fn dropped_bars(&self) -> usize {
        self.dropped_bars
    }

    /// Current cursor position. Starts at 0.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Moves to the next benchmark step; the first call enters index 0.
    /// Returns `false` once the timeline is exhausted.
    pub fn advance(&mut self) -> bool {
        if !self.started {
            self.started = true;
            return !self.timeline.is_empty();
        }
        self.cursor += 1;
        self.cursor < self.timeline.len()
    }

    /// Timestamp of the current step, when inside the timeline.
    #[must_use]
    pub fn current_timestamp(&self) -> Option<i64> {
        self.timeline.get(self.cursor).copied()
    }

    /// Bars present at the current step, keyed by symbol in sorted order.
    #[must_use]
    pub fn current_bars(&self) -> BTreeMap<&str, &Bar> {
        self.series
            .iter()
            .filter_map(|(symbol, slots)| {
                slots
                    .get(self.cursor)
                    .and_then(Option::as_ref)
                    .map(|bar| (symbol.as_str(), bar))
            })
            .collect()
    }

    /// The symbol's bar at the current step, if present.
    #[must_use]
    pub fn current_bar(&self, symbol: &str) -> Option<&Bar> {
        self.series.get(symbol)?.get(self.cursor)?.as_ref()
    }

    /// Up to `count` most recent present bars at indices `[0, current]`,
    /// oldest first, current bar last.
    ///
    /// # Panics
    /// `count == 0` is a programmer error.
    #[must_use]
    pub fn get_bars(&self, symbol: &str, count: usize) -> Vec<&Bar> {
        assert!(count >= 1, "get_bars requires count >= 1");

        let Some(slots) = self.series.get(symbol) else {
            return Vec::new();
        };
        let end = (self.cursor + 1).min(slots.len());

        let mut bars: Vec<&Bar> = slots[..end]
            .iter()
            .rev()
            .filter_map(Option::as_ref)
            .take(count)
            .collect();
        bars.reverse();
        bars
    }

    /// Whether the symbol can trade at the current step: a bar is present
    /// and it is not flagged suspended.
    #[must_use]
    pub fn is_tradable(&self, symbol: &str) -> bool {
        self.current_bar(symbol).is_some_and(|bar| !bar.suspended)
    }

    /// Aligned slots for a symbol, for indicator precomputation.
    #[must_use]
    pub fn aligned_series(&self, symbol: &str) -> Option<&[Option<Bar>]> {
        self.series.get(symbol).map(Vec::as_slice)
    }

    /// Benchmark bar at the current step.
    #[must_use]
    pub fn current_benchmark_bar(&self) -> Option<&Bar> {
        self.benchmark_bars.get(self.cursor)
    }

    /// First benchmark bar, anchoring the buy-and-hold reference curve.
    #[must_use]
    pub fn first_benchmark_bar(&self) -> Option<&Bar> {
        self.benchmark_bars.first()
    }
}

/// Keeps only bars with `start_ns <= timestamp <= end_ns`. `None` bounds are
/// open.
#[must_use]
pub fn filter_by_range(bars: Vec<Bar>, start_ns: Option<i64>, end_ns: Option<i64>) -> Vec<Bar> {
    bars.into_iter()
        .filter(|bar| {
            start_ns.is_none_or(|s| bar.timestamp_ns >= s)
                && end_ns.is_none_or(|e| bar.timestamp_ns <= e)
        })
        .collect()
}
