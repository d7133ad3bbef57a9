// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// portfolio analytics layer.  Every series function returns a vector of
// `Option<f64>` aligned index-for-index with its input, so callers can zip an
// indicator overlay straight onto the price series; positions without enough
// history carry `None` rather than being dropped.
//
// The one deliberate asymmetry: RSI operates on day-over-day differences and
// therefore returns a series one element shorter than its input.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_with, MacdConfig, MacdResult};
pub use rsi::{calculate_rsi, DEFAULT_RSI_PERIOD};
pub use sma::calculate_sma;
