// =============================================================================
// Chart Series Assembler
// =============================================================================
//
// Turns a raw price history plus a set of indicator selection flags into one
// display-ready sequence of per-date rows.  Selection is a projection: an
// indicator that was not requested is simply omitted from the output row
// (via `skip_serializing_if`), it is not emitted as null.  Each selected
// indicator is computed independently over the full series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::{calculate_ema, calculate_macd, calculate_sma};

/// Window sizes used by the chart layer.  The engine itself is window-
/// agnostic; these are the values the application's call sites use.
pub const SMA_SHORT_PERIOD: usize = 20;
pub const SMA_LONG_PERIOD: usize = 50;
pub const EMA_FAST_PERIOD: usize = 12;
pub const EMA_SLOW_PERIOD: usize = 26;

/// A single observed price on a given date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Which indicator overlays to include when assembling chart data.
/// `macd` brings the signal and histogram columns with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorSelection {
    pub sma20: bool,
    pub sma50: bool,
    pub ema12: bool,
    pub ema26: bool,
    pub macd: bool,
}

impl IndicatorSelection {
    /// Select every available overlay.
    pub fn all() -> Self {
        Self {
            sma20: true,
            sma50: true,
            ema12: true,
            ema26: true,
            macd: true,
        }
    }
}

/// One display-ready row: the date (ISO `YYYY-MM-DD`), the price, and the
/// selected indicator values where defined.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema12: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema26: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<f64>,
}

/// Assemble per-date chart rows from a price history and a selection of
/// indicator overlays.
///
/// The output has one row per input point, in input order.  Indicators that
/// were not selected never appear; selected indicators appear only once
/// their warm-up has elapsed.
pub fn chart_data_with_indicators(
    price_data: &[PricePoint],
    selection: IndicatorSelection,
) -> Vec<ChartPoint> {
    let prices: Vec<f64> = price_data.iter().map(|p| p.price).collect();

    let sma20 = selection
        .sma20
        .then(|| calculate_sma(&prices, SMA_SHORT_PERIOD));
    let sma50 = selection
        .sma50
        .then(|| calculate_sma(&prices, SMA_LONG_PERIOD));
    let ema12 = selection
        .ema12
        .then(|| calculate_ema(&prices, EMA_FAST_PERIOD));
    let ema26 = selection
        .ema26
        .then(|| calculate_ema(&prices, EMA_SLOW_PERIOD));
    let macd = selection.macd.then(|| calculate_macd(&prices));

    price_data
        .iter()
        .enumerate()
        .map(|(i, p)| ChartPoint {
            date: p.date.format("%Y-%m-%d").to_string(),
            price: p.price,
            sma20: sma20.as_ref().and_then(|s| s[i]),
            sma50: sma50.as_ref().and_then(|s| s[i]),
            ema12: ema12.as_ref().and_then(|s| s[i]),
            ema26: ema26.as_ref().and_then(|s| s[i]),
            macd: macd.as_ref().and_then(|m| m.macd[i]),
            signal: macd.as_ref().and_then(|m| m.signal[i]),
            histogram: macd.as_ref().and_then(|m| m.histogram[i]),
        })
        .collect()
}
