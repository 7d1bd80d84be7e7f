//! Relative Strength Index with Wilder smoothing.

/// RSI over `period` changes. The first `period` slots are `NaN`; a flat
/// window reads 50, a pure uptrend 100, a pure downtrend 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let len = values.len();
    let mut result = vec![f64::NAN; len];

    if period < 1 || len < period + 1 {
        return result;
    }

    let period_f = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period_f;
    avg_loss /= period_f;
    result[period] = rsi_value(avg_gain, avg_loss);

    let keep = (period_f - 1.0) / period_f;
    for i in period + 1..len {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        avg_gain = avg_gain.mul_add(keep, gain / period_f);
        avg_loss = avg_loss.mul_add(keep, loss / period_f);
        result[i] = rsi_value(avg_gain, avg_loss);
    }

    result
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}
