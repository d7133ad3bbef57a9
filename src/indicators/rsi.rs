// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute deltas from consecutive prices.
// Step 2 — Seed average gain / average loss with the SMA of the first
//          `period` gains / losses.
// Step 3 — Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Because RSI is defined on differences, the output is one element shorter
// than the input — output index i corresponds to the delta between prices
// i and i + 1.  This asymmetry with SMA/EMA/MACD is part of the contract.

/// Standard RSI look-back used by the chart layer.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI series for the given `prices` and `period`.
///
/// The returned vector has length `prices.len() - 1` (empty input stays
/// empty); the first `period` entries are `None`.  Every defined value lies
/// in `[0, 100]` — the zero-average-loss case is guarded so no NaN or
/// infinity can escape.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - fewer than `period` deltas => all `None`
/// - only gains (avg_loss == 0) => saturates at 100.0
/// - no movement at all => 50.0 (neutral)
pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    if period == 0 || deltas.len() < period {
        return vec![None; deltas.len()];
    }

    // Seed averages from the first `period` deltas.
    let (sum_gain, sum_loss) = deltas[..period]
        .iter()
        .fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l + d.abs())
            }
        });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let mut rsi = vec![None; period];
    rsi.reserve(deltas.len() - period);

    // Wilder's smoothing for each delta past the seed window.
    for &delta in &deltas[period..] {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        rsi.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    rsi
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - Average loss zero with some gain => 100.0 (pure uptrend).
/// - Both averages zero => 50.0 (no movement, neutral).
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}
