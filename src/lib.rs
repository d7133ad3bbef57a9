// =============================================================================
// Vega Portfolio — analytics core
// =============================================================================
//
// The numeric heart of the portfolio tracker: pure technical-indicator math
// over daily price series, the chart assembler that projects selected
// overlays onto a price history, and the cache-fronted market-data service
// that turns flaky upstream quote lookups into a simple price-or-nothing
// answer.
//
// Routing, persistence, auth, and billing live in the surrounding
// application; this crate is a plain library boundary.

pub mod chart;
pub mod indicators;
pub mod market_data;

pub use chart::{chart_data_with_indicators, ChartPoint, IndicatorSelection, PricePoint};
pub use indicators::{
    calculate_ema, calculate_macd, calculate_macd_with, calculate_rsi, calculate_sma, MacdConfig,
    MacdResult, DEFAULT_RSI_PERIOD,
};
pub use market_data::{
    generate_mock_price_history, AlphaVantageClient, MarketDataService, PriceCache, PriceData,
};
