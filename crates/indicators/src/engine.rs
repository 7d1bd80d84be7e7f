//! The indicator engine: registration, precompute, cursor-guarded reads.

use std::collections::{BTreeMap, HashMap};

use ashare_data::DataFeed;
use ashare_types::Bar;

use crate::def::{BuiltinIndicator, IndicatorDef};
use crate::error::IndicatorError;
use crate::impl_::{ema, rsi, sma};

static EMPTY: [f64; 0] = [];

/// Precomputes every registered indicator over the benchmark timeline and
/// serves values at or before the cursor only.
///
/// Registration happens during the strategy's start callback; `precompute`
/// then runs exactly once, and the engine is read-only for the rest of the
/// run apart from the cursor the main loop advances.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    defs: BTreeMap<String, IndicatorDef>,
    values: HashMap<(String, String), Vec<f64>>,
    cursor: usize,
    computed: bool,
}

impl IndicatorEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an indicator under `name`.
    ///
    /// # Errors
    /// - [`IndicatorError::DuplicateName`] if the name is taken.
    /// - [`IndicatorError::RegistrationClosed`] after `precompute` ran.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        def: IndicatorDef,
    ) -> Result<(), IndicatorError> {
        let name = name.into();
        if self.computed {
            return Err(IndicatorError::RegistrationClosed(name));
        }
        if self.defs.contains_key(&name) {
            return Err(IndicatorError::DuplicateName(name));
        }
        self.defs.insert(name, def);
        Ok(())
    }

    /// Whether any indicator was registered.
    #[must_use]
    pub fn has_indicators(&self) -> bool {
        !self.defs.is_empty()
    }

    /// Computes every registered indicator for every symbol in the feed.
    ///
    /// # Errors
    /// - [`IndicatorError::AlreadyComputed`] on a second call.
    /// - [`IndicatorError::UserFunction`] when a user callable fails; the
    ///   bar index and symbol are attached.
    pub fn precompute(&mut self, feed: &DataFeed) -> Result<(), IndicatorError> {
        if self.computed {
            return Err(IndicatorError::AlreadyComputed);
        }
        self.computed = true;

        let symbols: Vec<String> = feed.symbols().map(str::to_string).collect();
        for (name, def) in &self.defs {
            for symbol in &symbols {
                let Some(aligned) = feed.aligned_series(symbol) else {
                    continue;
                };
                let dense = match def {
                    IndicatorDef::Builtin(builtin) => compute_builtin(*builtin, aligned),
                    IndicatorDef::Callable { func, lookback } => {
                        compute_callable(func, *lookback, aligned).map_err(|(index, message)| {
                            IndicatorError::UserFunction {
                                name: name.clone(),
                                symbol: symbol.clone(),
                                index,
                                message,
                            }
                        })?
                    }
                };
                self.values.insert((name.clone(), symbol.clone()), dense);
            }
        }
        Ok(())
    }

    /// Moves the read cursor; called by the main loop before each bar.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
    }

    /// Value at the cursor, `None` when missing or unknown.
    #[must_use]
    pub fn value(&self, name: &str, symbol: &str) -> Option<f64> {
        let series = self.series(name, symbol)?;
        let value = *series.get(self.cursor)?;
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Values at indices `[max(0, cursor + 1 - count), cursor]`, oldest
    /// first, missing slots preserved as `NaN`. Empty for unknown keys.
    ///
    /// The slice never extends past the cursor, so a strategy cannot read
    /// into the future no matter what `count` it asks for.
    #[must_use]
    pub fn history(&self, name: &str, symbol: &str, count: usize) -> &[f64] {
        let Some(series) = self.series(name, symbol) else {
            return &EMPTY;
        };
        if self.cursor >= series.len() || count == 0 {
            return &EMPTY;
        }
        let start = (self.cursor + 1).saturating_sub(count);
        &series[start..=self.cursor]
    }

    fn series(&self, name: &str, symbol: &str) -> Option<&Vec<f64>> {
        self.values.get(&(name.to_string(), symbol.to_string()))
    }
}

fn compute_builtin(builtin: BuiltinIndicator, aligned: &[Option<Bar>]) -> Vec<f64> {
    let (field, compact_fn): (_, fn(&[f64], usize) -> Vec<f64>) = match builtin {
        BuiltinIndicator::Sma { field, .. } => (field, sma),
        BuiltinIndicator::Ema { field, .. } => (field, ema),
        BuiltinIndicator::Rsi { field, .. } => (field, rsi),
    };
    let period = match builtin {
        BuiltinIndicator::Sma { period, .. }
        | BuiltinIndicator::Ema { period, .. }
        | BuiltinIndicator::Rsi { period, .. } => period,
    };

    // Run the rolling pass over present bars only, then scatter the compact
    // results back onto the timeline.
    let mut indices = Vec::new();
    let mut series = Vec::new();
    for (idx, slot) in aligned.iter().enumerate() {
        if let Some(bar) = slot {
            indices.push(idx);
            series.push(field.extract(bar));
        }
    }

    let compact = compact_fn(&series, period);
    let mut dense = vec![f64::NAN; aligned.len()];
    for (idx, value) in indices.into_iter().zip(compact) {
        dense[idx] = value;
    }
    dense
}

type UserFnError = (usize, String);

fn compute_callable(
    func: &crate::def::UserIndicatorFn,
    lookback: usize,
    aligned: &[Option<Bar>],
) -> Result<Vec<f64>, UserFnError> {
    let mut dense = vec![f64::NAN; aligned.len()];
    let mut window = Vec::with_capacity(lookback);

    for (idx, slot) in aligned.iter().enumerate() {
        if slot.is_none() {
            continue;
        }
        let start = (idx + 1).saturating_sub(lookback.max(1));
        window.clear();
        window.extend(aligned[start..=idx].iter().filter_map(|s| *s));

        match func(&window) {
            Ok(Some(value)) => dense[idx] = value,
            Ok(None) => {}
            Err(message) => return Err((idx, message)),
        }
    }
    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::Field;
    use approx::assert_relative_eq;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar {
            timestamp_ns: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
            amount: None,
            suspended: false,
        }
    }

    fn feed_with_closes(closes: &[f64]) -> DataFeed {
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i as i64 * 10, c))
            .collect();
        let mut feed = DataFeed::new();
        feed.set_benchmark(bars.clone()).unwrap();
        feed.add_market_data("X", bars).unwrap();
        feed
    }

    fn sma3() -> IndicatorDef {
        IndicatorDef::Builtin(BuiltinIndicator::Sma {
            period: 3,
            field: Field::Close,
        })
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut engine = IndicatorEngine::new();
        engine.register("sma3", sma3()).unwrap();
        assert!(matches!(
            engine.register("sma3", sma3()),
            Err(IndicatorError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_registration_closed_after_precompute() {
        let feed = feed_with_closes(&[1.0, 2.0, 3.0]);
        let mut engine = IndicatorEngine::new();
        engine.register("sma3", sma3()).unwrap();
        engine.precompute(&feed).unwrap();

        assert!(matches!(
            engine.register("late", sma3()),
            Err(IndicatorError::RegistrationClosed(_))
        ));
        assert!(matches!(
            engine.precompute(&feed),
            Err(IndicatorError::AlreadyComputed)
        ));
    }

    #[test]
    fn test_future_leak_guard() {
        // Closes 1..=10, SMA(3): value at index 4 is (3+4+5)/3 = 4.0.
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let feed = feed_with_closes(&closes);
        let mut engine = IndicatorEngine::new();
        engine.register("sma3", sma3()).unwrap();
        engine.precompute(&feed).unwrap();

        engine.set_cursor(4);
        assert_relative_eq!(engine.value("sma3", "X").unwrap(), 4.0, epsilon = 1e-10);

        let history = engine.history("sma3", "X", 10);
        assert_eq!(history.len(), 5);
        assert!(history[0].is_nan());
        assert!(history[1].is_nan());
        assert_relative_eq!(history[4], 4.0, epsilon = 1e-10);
        // Never the value at index 5, whatever the count.
        assert_relative_eq!(
            *history.last().unwrap(),
            4.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_missing_slot_stays_missing() {
        let bars = vec![bar(0, 1.0), bar(10, 2.0), bar(30, 4.0)];
        let benchmark = vec![bar(0, 1.0), bar(10, 1.0), bar(20, 1.0), bar(30, 1.0)];
        let mut feed = DataFeed::new();
        feed.set_benchmark(benchmark).unwrap();
        feed.add_market_data("X", bars).unwrap();

        let mut engine = IndicatorEngine::new();
        engine
            .register(
                "sma2",
                IndicatorDef::Builtin(BuiltinIndicator::Sma {
                    period: 2,
                    field: Field::Close,
                }),
            )
            .unwrap();
        engine.precompute(&feed).unwrap();

        // Index 2 has no bar for X: missing regardless of cursor.
        engine.set_cursor(2);
        assert!(engine.value("sma2", "X").is_none());

        // Index 3: SMA over the two most recent present bars (2.0, 4.0).
        engine.set_cursor(3);
        assert_relative_eq!(engine.value("sma2", "X").unwrap(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_user_callable_window_and_missing() {
        let feed = feed_with_closes(&[1.0, 2.0, 3.0, 4.0]);
        let mut engine = IndicatorEngine::new();
        engine
            .register(
                "range",
                IndicatorDef::Callable {
                    func: Box::new(|bars| {
                        if bars.len() < 2 {
                            return Ok(None);
                        }
                        let first = bars.first().map(|b| b.close).unwrap_or(f64::NAN);
                        let last = bars.last().map(|b| b.close).unwrap_or(f64::NAN);
                        Ok(Some(last - first))
                    }),
                    lookback: 2,
                },
            )
            .unwrap();
        engine.precompute(&feed).unwrap();

        engine.set_cursor(0);
        assert!(engine.value("range", "X").is_none());
        engine.set_cursor(3);
        assert_relative_eq!(engine.value("range", "X").unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_user_callable_error_carries_context() {
        let feed = feed_with_closes(&[1.0, 2.0]);
        let mut engine = IndicatorEngine::new();
        engine
            .register(
                "bad",
                IndicatorDef::Callable {
                    func: Box::new(|_| Err("boom".to_string())),
                    lookback: 1,
                },
            )
            .unwrap();

        let err = engine.precompute(&feed).unwrap_err();
        match err {
            IndicatorError::UserFunction { name, symbol, index, message } => {
                assert_eq!(name, "bad");
                assert_eq!(symbol, "X");
                assert_eq!(index, 0);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_precompute_is_deterministic() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let make = || {
            let feed = feed_with_closes(&closes);
            let mut engine = IndicatorEngine::new();
            engine.register("sma3", sma3()).unwrap();
            engine.precompute(&feed).unwrap();
            engine.set_cursor(19);
            engine.history("sma3", "X", 20).to_vec()
        };
        let a = make();
        let b = make();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(x.is_nan() == y.is_nan());
            if !x.is_nan() {
                assert_relative_eq!(x, y, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_unknown_keys_read_empty() {
        let engine = IndicatorEngine::new();
        assert!(engine.value("nope", "X").is_none());
        assert!(engine.history("nope", "X", 5).is_empty());
    }
}
