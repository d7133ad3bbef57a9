// =============================================================================
// Upstream Quote Provider — Alpha Vantage REST adapter
// =============================================================================
//
// Thin HTTP adapter over the Alpha Vantage query endpoint.  Every request
// carries a 10-second timeout so a hung provider cannot block callers
// indefinitely.  Responses are parsed defensively: the payload shape varies
// by function selector and fields are frequently absent (rate limiting,
// unknown symbols), so every extraction step is a fallible `Context` hop.
//
// Errors surfaced here are internal diagnostics only — the service layer
// collapses them all into "no data".

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Environment variable holding the Alpha Vantage API key.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Timeout applied to every upstream request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of daily bars returned by `daily_series`.
const MAX_SERIES_POINTS: usize = 100;

/// A parsed GLOBAL_QUOTE response.
#[derive(Debug, Clone)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_percent: String,
}

/// A single OHLCV bar from the daily or intraday time-series endpoints.
/// `date` is an ISO date for daily bars and a date-time for intraday ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Bar spacing accepted by the TIME_SERIES_INTRADAY endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntradayInterval {
    Min1,
    Min5,
    Min15,
    Min30,
    #[default]
    Min60,
}

impl IntradayInterval {
    /// Wire value sent to the provider; it also names the response field
    /// (`Time Series (60min)` etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min1 => "1min",
            Self::Min5 => "5min",
            Self::Min15 => "15min",
            Self::Min30 => "30min",
            Self::Min60 => "60min",
        }
    }
}

impl std::fmt::Display for IntradayInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Abstraction over the upstream market-data provider, so the service layer
/// can be exercised against a mock without touching the network.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Latest quote for an equity/fund symbol (GLOBAL_QUOTE).
    async fn global_quote(&self, symbol: &str) -> Result<Quote>;

    /// Spot exchange rate between two currencies (CURRENCY_EXCHANGE_RATE);
    /// used for crypto priced against a fiat market.
    async fn exchange_rate(&self, from: &str, to: &str) -> Result<f64>;

    /// Daily OHLCV history in chronological order (TIME_SERIES_DAILY).
    async fn daily_series(&self, symbol: &str, full: bool) -> Result<Vec<SeriesBar>>;

    /// Intraday OHLCV history in chronological order (TIME_SERIES_INTRADAY).
    async fn intraday_series(
        &self,
        symbol: &str,
        interval: IntradayInterval,
    ) -> Result<Vec<SeriesBar>>;
}

/// Alpha Vantage REST client.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AlphaVantageClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new client with the given API key.  An empty key is allowed
    /// at construction time; requests will fail (and collapse to "no data"
    /// at the service layer) until a key is configured.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        debug!("AlphaVantageClient initialised (base_url={BASE_URL})");

        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            client,
        }
    }

    /// Build a client from the `ALPHA_VANTAGE_API_KEY` environment variable.
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).unwrap_or_default())
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Issue a GET against the query endpoint and parse the JSON body.
    async fn query(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        if self.api_key.is_empty() {
            anyhow::bail!("Alpha Vantage API key not configured");
        }

        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.api_key.as_str()));

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .context("quote provider request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse provider response as JSON")?;

        if !status.is_success() {
            anyhow::bail!("quote provider returned {status}: {body}");
        }

        Ok(body)
    }

    /// Parse a JSON field that Alpha Vantage encodes as a numeric string.
    fn parse_str_f64(val: &serde_json::Value, field: &str) -> Result<f64> {
        let s = val
            .as_str()
            .with_context(|| format!("field '{field}' is not a string: {val}"))?;
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64 for field '{field}'"))
    }

    /// Turn a time-series response object into chronological bars, keeping
    /// at most the `MAX_SERIES_POINTS` most recent ones.
    ///
    /// serde_json object keys are sorted, and the keys are ISO timestamps,
    /// so iteration is already chronological.
    fn collect_bars(series: &serde_json::Map<String, serde_json::Value>) -> Result<Vec<SeriesBar>> {
        let mut bars = Vec::with_capacity(series.len().min(MAX_SERIES_POINTS));
        let skip = series.len().saturating_sub(MAX_SERIES_POINTS);
        for (date, values) in series.iter().skip(skip) {
            bars.push(SeriesBar {
                date: date.clone(),
                open: Self::parse_str_f64(&values["1. open"], "1. open")?,
                high: Self::parse_str_f64(&values["2. high"], "2. high")?,
                low: Self::parse_str_f64(&values["3. low"], "3. low")?,
                close: Self::parse_str_f64(&values["4. close"], "4. close")?,
                volume: values["5. volume"]
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            });
        }
        Ok(bars)
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    #[instrument(skip(self), name = "alpha_vantage::global_quote")]
    async fn global_quote(&self, symbol: &str) -> Result<Quote> {
        let body = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;

        let quote = &body["Global Quote"];
        let price = Self::parse_str_f64(&quote["05. price"], "05. price")
            .with_context(|| format!("no quote data for symbol {symbol}"))?;

        // Change fields are informational; default rather than fail.
        let change = quote["09. change"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);
        let change_percent = quote["10. change percent"]
            .as_str()
            .unwrap_or("0%")
            .to_string();

        debug!(symbol, price, "quote fetched");
        Ok(Quote {
            price,
            change,
            change_percent,
        })
    }

    #[instrument(skip(self), name = "alpha_vantage::exchange_rate")]
    async fn exchange_rate(&self, from: &str, to: &str) -> Result<f64> {
        let body = self
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", from),
                ("to_currency", to),
            ])
            .await?;

        let rate = &body["Realtime Currency Exchange Rate"]["5. Exchange Rate"];
        let price = Self::parse_str_f64(rate, "5. Exchange Rate")
            .with_context(|| format!("no exchange rate data for {from}/{to}"))?;

        debug!(from, to, price, "exchange rate fetched");
        Ok(price)
    }

    #[instrument(skip(self), name = "alpha_vantage::daily_series")]
    async fn daily_series(&self, symbol: &str, full: bool) -> Result<Vec<SeriesBar>> {
        let outputsize = if full { "full" } else { "compact" };
        let body = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", outputsize),
            ])
            .await?;

        let series = body["Time Series (Daily)"]
            .as_object()
            .with_context(|| format!("no time series data for symbol {symbol}"))?;

        let bars = Self::collect_bars(series)?;
        debug!(symbol, count = bars.len(), "daily series fetched");
        Ok(bars)
    }

    #[instrument(skip(self), name = "alpha_vantage::intraday_series")]
    async fn intraday_series(
        &self,
        symbol: &str,
        interval: IntradayInterval,
    ) -> Result<Vec<SeriesBar>> {
        let body = self
            .query(&[
                ("function", "TIME_SERIES_INTRADAY"),
                ("symbol", symbol),
                ("interval", interval.as_str()),
            ])
            .await?;

        // The response field is named after the interval.
        let field = format!("Time Series ({})", interval.as_str());
        let series = body[field.as_str()]
            .as_object()
            .with_context(|| format!("no intraday data for symbol {symbol}"))?;

        let bars = Self::collect_bars(series)?;
        debug!(symbol, interval = %interval, count = bars.len(), "intraday series fetched");
        Ok(bars)
    }
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = AlphaVantageClient::new("");
        let err = client.global_quote("AAPL").await.unwrap_err();
        assert!(err.to_string().contains("API key not configured"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = AlphaVantageClient::new("super-secret");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn interval_wire_values() {
        assert_eq!(IntradayInterval::default(), IntradayInterval::Min60);
        assert_eq!(IntradayInterval::Min1.as_str(), "1min");
        assert_eq!(IntradayInterval::Min60.to_string(), "60min");
    }

    #[test]
    fn collect_bars_caps_at_most_recent_and_stays_chronological() {
        let mut series = serde_json::Map::new();
        for month in 1..=4u32 {
            for day in 1..=28u32 {
                series.insert(
                    format!("2025-{month:02}-{day:02}"),
                    serde_json::json!({
                        "1. open": "1.0",
                        "2. high": "2.0",
                        "3. low": "0.5",
                        "4. close": "1.5",
                        "5. volume": "100",
                    }),
                );
            }
        }
        assert_eq!(series.len(), 112);

        let bars = AlphaVantageClient::collect_bars(&series).unwrap();
        assert_eq!(bars.len(), 100);
        // Oldest 12 dropped, order preserved.
        assert_eq!(bars[0].date, "2025-01-13");
        assert_eq!(bars[99].date, "2025-04-28");
        for pair in bars.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn parse_str_f64_accepts_numeric_strings_only() {
        let val = serde_json::json!("123.45");
        assert!((AlphaVantageClient::parse_str_f64(&val, "x").unwrap() - 123.45).abs() < 1e-10);

        let bad = serde_json::json!({"nested": true});
        assert!(AlphaVantageClient::parse_str_f64(&bad, "x").is_err());

        let not_numeric = serde_json::json!("n/a");
        assert!(AlphaVantageClient::parse_str_f64(&not_numeric, "x").is_err());
    }
}
