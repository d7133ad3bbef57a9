// =============================================================================
// MACD (Moving Average Convergence/Divergence)
// =============================================================================
//
// MACD line  = EMA(fast) - EMA(slow), defined where both EMAs are.
// Signal     = EMA(signal_period) of the MACD line — but computed over the
//              *defined* MACD values only, so its warm-up is measured from
//              the first defined MACD value, not from the start of the price
//              series.
// Histogram  = MACD - Signal wherever both are defined.
//
// The signal-line warm-up offset is handled with an explicit dense/sparse
// model: the defined MACD values form a contiguous dense array, the signal
// EMA runs over that array, and `expand` translates dense positions back to
// original series indices.  Implicit null-skipping arithmetic is exactly the
// kind of thing that silently misaligns, so the offset is carried as a value.

use crate::indicators::ema::calculate_ema;

/// EMA windows used for the MACD calculation.
///
/// Call sites invariably use the classic 12/26/9, but the windows stay
/// configurable at this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// The three aligned MACD output series.  Each has the same length as the
/// input price series; each is absent until its own warm-up elapses.
#[derive(Debug, Clone)]
pub struct MacdResult {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Compute MACD with the standard 12/26/9 windows.
pub fn calculate_macd(prices: &[f64]) -> MacdResult {
    calculate_macd_with(prices, MacdConfig::default())
}

/// Compute MACD with explicit windows.
pub fn calculate_macd_with(prices: &[f64], config: MacdConfig) -> MacdResult {
    let fast = calculate_ema(prices, config.fast_period);
    let slow = calculate_ema(prices, config.slow_period);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // Signal line over the compacted MACD values, re-expanded to series
    // positions.
    let (dense, offset) = compact(&macd);
    let signal_dense = calculate_ema(&dense, config.signal_period);
    let signal = expand(&signal_dense, offset, macd.len());

    let histogram: Vec<Option<f64>> = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    MacdResult {
        macd,
        signal,
        histogram,
    }
}

/// Strip the leading `None` run from a sparse series.
///
/// Returns the contiguous defined values plus the original index of the
/// first defined entry.  The MACD line is `None` for a prefix and defined
/// for the remainder, so a single offset fully describes the mapping.
fn compact(sparse: &[Option<f64>]) -> (Vec<f64>, usize) {
    let offset = sparse
        .iter()
        .position(|v| v.is_some())
        .unwrap_or(sparse.len());
    let dense: Vec<f64> = sparse[offset..].iter().filter_map(|v| *v).collect();
    (dense, offset)
}

/// Translate a dense-indexed series back onto original series positions:
/// dense index `j` lands at sparse index `offset + j`.
fn expand(dense: &[Option<f64>], offset: usize, len: usize) -> Vec<Option<f64>> {
    let mut sparse = vec![None; len];
    for (j, v) in dense.iter().enumerate() {
        if let Some(x) = v {
            if offset + j < len {
                sparse[offset + j] = Some(*x);
            }
        }
    }
    sparse
}
