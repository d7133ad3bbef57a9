// =============================================================================
// Vega Portfolio — smoke/demo runner
// =============================================================================
//
// Exercises the analytics core end to end: synthetic history through the
// indicator pipeline, then (if an API key is configured) a pair of live
// quote lookups through the cache.  Useful for eyeballing log output; the
// real consumers call the library directly.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vega_portfolio::chart::{chart_data_with_indicators, IndicatorSelection};
use vega_portfolio::indicators::{calculate_rsi, DEFAULT_RSI_PERIOD};
use vega_portfolio::market_data::{generate_mock_price_history, AlphaVantageClient, MarketDataService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 1. Indicator pipeline over synthetic history ─────────────────────
    let history = generate_mock_price_history(100.0, 365, 0.02);
    let chart = chart_data_with_indicators(&history, IndicatorSelection::all());

    let last = chart.last().expect("365-day history is never empty");
    info!(
        date = %last.date,
        price = last.price,
        sma20 = ?last.sma20,
        sma50 = ?last.sma50,
        macd = ?last.macd,
        histogram = ?last.histogram,
        "latest chart row"
    );

    let prices: Vec<f64> = history.iter().map(|p| p.price).collect();
    let rsi = calculate_rsi(&prices, DEFAULT_RSI_PERIOD);
    info!(rsi = ?rsi.last().copied().flatten(), "latest RSI");

    // ── 2. Live quotes through the cache (optional) ──────────────────────
    let service = MarketDataService::new(AlphaVantageClient::from_env());

    match service.stock_price("AAPL").await {
        Some(data) => info!(symbol = %data.symbol, price = data.price, "live stock quote"),
        None => warn!("no stock quote available (missing API key or upstream failure)"),
    }
    match service.crypto_price("BTC", "USD").await {
        Some(data) => info!(symbol = %data.symbol, price = data.price, "live crypto quote"),
        None => warn!("no crypto quote available (missing API key or upstream failure)"),
    }

    let stats = service.cache_stats();
    info!(size = stats.size, entries = ?stats.entries, "cache state at exit");

    Ok(())
}
