// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average.
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = (close_t - EMA_{t-1}) * multiplier + EMA_{t-1}
//
// The very first EMA value (at index `period - 1`) is seeded with the SMA of
// the first `period` prices.  That seeding rule is load-bearing: it changes
// the first several output values measurably, and downstream MACD figures
// depend on it.

/// Compute the EMA series for the given `prices` and look-back `period`.
///
/// The returned vector has the same length as `prices`; entries before index
/// `period - 1` are `None`.  The value at `period - 1` equals
/// `calculate_sma(prices, period)[period - 1]` exactly.
///
/// # Edge cases
/// - `period == 0` => all `None` (division by zero guard)
/// - `prices.len() < period` => all `None`
pub fn calculate_ema(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || prices.len() < period {
        return vec![None; prices.len()];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of the first `period` prices.
    let seed = prices[..period].iter().sum::<f64>() / period as f64;

    let mut ema = vec![None; prices.len()];
    ema[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..prices.len() {
        let next = (prices[i] - prev) * multiplier + prev;
        ema[i] = Some(next);
        prev = next;
    }

    ema
}
