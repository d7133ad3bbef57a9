// =============================================================================
// Market Data Service — cache-fronted live price lookups
// =============================================================================
//
// Combines the price cache with an upstream quote provider.  The contract
// with callers is deliberately narrow: a lookup either yields a price or it
// does not.  Missing credentials, network failures, timeouts, malformed
// payloads, and unknown symbols all collapse to `None` — the cause is logged
// here, never surfaced as a distinct error type.  A failed fetch never
// populates the cache.
//
// Concurrent lookups for the same cold key each hit the upstream (no
// single-flight); racing refreshes are last-write-wins, which is harmless
// because both writers carry equally fresh data.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::market_data::provider::{IntradayInterval, QuoteProvider, SeriesBar};
use crate::market_data::quote_cache::{CacheStats, PriceCache};

/// A live price for a symbol.  `change`/`change_percent` are present only on
/// a fresh equity fetch — cache hits and crypto lookups do not carry them.
#[derive(Debug, Clone, Serialize)]
pub struct PriceData {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<String>,
}

/// Cache-fronted market data lookups over any [`QuoteProvider`].
pub struct MarketDataService<P: QuoteProvider> {
    provider: P,
    cache: PriceCache,
}

impl<P: QuoteProvider> MarketDataService<P> {
    /// Create a service with the standard 60-second cache.
    pub fn new(provider: P) -> Self {
        Self::with_cache(provider, PriceCache::new())
    }

    /// Create a service around an explicitly configured cache.
    pub fn with_cache(provider: P, cache: PriceCache) -> Self {
        Self { provider, cache }
    }

    // -------------------------------------------------------------------------
    // Live prices
    // -------------------------------------------------------------------------

    /// Current price for an equity/fund symbol, from cache when fresh.
    ///
    /// Never errors: every upstream failure mode collapses to `None`.
    pub async fn stock_price(&self, symbol: &str) -> Option<PriceData> {
        let key = symbol.to_uppercase();

        if let Some(hit) = self.cache.get(&key) {
            debug!(symbol = %key, "serving stock price from cache");
            return Some(PriceData {
                symbol: hit.symbol,
                price: hit.price,
                timestamp: hit.fetched_at,
                change: None,
                change_percent: None,
            });
        }

        match self.provider.global_quote(&key).await {
            Ok(quote) => {
                self.cache.insert(key.clone(), key.clone(), quote.price);
                Some(PriceData {
                    symbol: key,
                    price: quote.price,
                    timestamp: Utc::now(),
                    change: Some(quote.change),
                    change_percent: Some(quote.change_percent),
                })
            }
            Err(e) => {
                warn!(symbol = %key, error = %e, "stock price unavailable");
                None
            }
        }
    }

    /// Current price for a cryptocurrency quoted in `market` (e.g. "USD").
    ///
    /// The cache key is the composite `SYMBOL-MARKET` pair; the display
    /// symbol is `SYMBOL/MARKET`.  Same absence-on-failure contract as
    /// [`stock_price`](Self::stock_price).
    pub async fn crypto_price(&self, symbol: &str, market: &str) -> Option<PriceData> {
        let from = symbol.to_uppercase();
        let to = market.to_uppercase();
        let key = format!("{from}-{to}");
        let display_symbol = format!("{from}/{to}");

        if let Some(hit) = self.cache.get(&key) {
            debug!(symbol = %display_symbol, "serving crypto price from cache");
            return Some(PriceData {
                symbol: hit.symbol,
                price: hit.price,
                timestamp: hit.fetched_at,
                change: None,
                change_percent: None,
            });
        }

        match self.provider.exchange_rate(&from, &to).await {
            Ok(price) => {
                self.cache.insert(key, display_symbol.clone(), price);
                Some(PriceData {
                    symbol: display_symbol,
                    price,
                    timestamp: Utc::now(),
                    change: None,
                    change_percent: None,
                })
            }
            Err(e) => {
                warn!(symbol = %display_symbol, error = %e, "crypto price unavailable");
                None
            }
        }
    }

    /// Fetch several stock prices concurrently; symbols that fail are
    /// silently dropped from the result.
    pub async fn stock_prices_batch(&self, symbols: &[&str]) -> Vec<PriceData> {
        let lookups = symbols.iter().map(|s| self.stock_price(s));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    // -------------------------------------------------------------------------
    // Historical series
    // -------------------------------------------------------------------------

    /// Daily OHLCV history for a symbol, chronological, at most 100 bars.
    /// Not cached — history requests are infrequent.  `None` on any failure.
    pub async fn stock_time_series(&self, symbol: &str, full: bool) -> Option<Vec<SeriesBar>> {
        let key = symbol.to_uppercase();
        match self.provider.daily_series(&key, full).await {
            Ok(bars) => Some(bars),
            Err(e) => {
                warn!(symbol = %key, error = %e, "time series unavailable");
                None
            }
        }
    }

    /// Intraday OHLCV history at the given bar interval, chronological, at
    /// most 100 bars.  Same not-cached, `None`-on-failure contract as
    /// [`stock_time_series`](Self::stock_time_series).
    pub async fn stock_intraday_series(
        &self,
        symbol: &str,
        interval: IntradayInterval,
    ) -> Option<Vec<SeriesBar>> {
        let key = symbol.to_uppercase();
        match self.provider.intraday_series(&key, interval).await {
            Ok(bars) => Some(bars),
            Err(e) => {
                warn!(symbol = %key, interval = %interval, error = %e, "intraday series unavailable");
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Cache management
    // -------------------------------------------------------------------------

    /// Wipe the cache.  Intended for test isolation.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Current cache entry count and key set.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::provider::Quote;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Provider double that counts upstream calls and can be told to fail.
    #[derive(Default)]
    struct MockProvider {
        quote_price: Option<f64>,
        rate_price: Option<f64>,
        bars: Option<Vec<SeriesBar>>,
        quote_calls: AtomicUsize,
        rate_calls: AtomicUsize,
    }

    impl MockProvider {
        fn with_quote(price: f64) -> Self {
            Self {
                quote_price: Some(price),
                ..Default::default()
            }
        }

        fn with_rate(price: f64) -> Self {
            Self {
                rate_price: Some(price),
                ..Default::default()
            }
        }

        fn with_bars(bars: Vec<SeriesBar>) -> Self {
            Self {
                bars: Some(bars),
                ..Default::default()
            }
        }
    }

    fn bar(date: &str) -> SeriesBar {
        SeriesBar {
            date: date.to_string(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 100,
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        async fn global_quote(&self, _symbol: &str) -> Result<Quote> {
            self.quote_calls.fetch_add(1, Ordering::SeqCst);
            match self.quote_price {
                Some(price) => Ok(Quote {
                    price,
                    change: 1.25,
                    change_percent: "0.66%".to_string(),
                }),
                None => anyhow::bail!("upstream returned no quote data"),
            }
        }

        async fn exchange_rate(&self, _from: &str, _to: &str) -> Result<f64> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            self.rate_price
                .ok_or_else(|| anyhow::anyhow!("upstream returned no exchange rate"))
        }

        async fn daily_series(&self, _symbol: &str, _full: bool) -> Result<Vec<SeriesBar>> {
            self.bars
                .clone()
                .ok_or_else(|| anyhow::anyhow!("upstream returned no time series"))
        }

        async fn intraday_series(
            &self,
            _symbol: &str,
            _interval: IntradayInterval,
        ) -> Result<Vec<SeriesBar>> {
            self.bars
                .clone()
                .ok_or_else(|| anyhow::anyhow!("upstream returned no intraday data"))
        }
    }

    #[tokio::test]
    async fn fetch_success_then_cache_hit() {
        let service = MarketDataService::new(MockProvider::with_quote(189.5));

        let first = service.stock_price("AAPL").await.expect("price");
        assert_eq!(first.symbol, "AAPL");
        assert!((first.price - 189.5).abs() < 1e-10);
        assert_eq!(first.change, Some(1.25));

        let second = service.stock_price("AAPL").await.expect("cached price");
        assert!((second.price - 189.5).abs() < 1e-10);
        // Cache hits carry no change fields.
        assert_eq!(second.change, None);

        assert_eq!(service.provider.quote_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn symbol_is_normalized_to_uppercase() {
        let service = MarketDataService::new(MockProvider::with_quote(10.0));

        let data = service.stock_price("aapl").await.unwrap();
        assert_eq!(data.symbol, "AAPL");

        // Same key regardless of input case: no second upstream call.
        service.stock_price("AaPl").await.unwrap();
        assert_eq!(service.provider.quote_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.cache_stats().entries, vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn expired_entry_triggers_exactly_one_refetch() {
        let service = MarketDataService::with_cache(
            MockProvider::with_quote(189.5),
            PriceCache::with_ttl(Duration::ZERO),
        );

        service.stock_price("AAPL").await.unwrap();
        service.stock_price("AAPL").await.unwrap();
        assert_eq!(service.provider.quote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_failure_returns_none_and_does_not_cache() {
        let service = MarketDataService::new(MockProvider::default());

        assert!(service.stock_price("AAPL").await.is_none());
        assert_eq!(service.cache_stats().size, 0);

        // Every retry hits upstream again — failures are never cached either.
        assert!(service.stock_price("AAPL").await.is_none());
        assert_eq!(service.provider.quote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn crypto_round_trip_with_composite_key() {
        let service = MarketDataService::new(MockProvider::with_rate(42500.50));

        let first = service.crypto_price("BTC", "USD").await.expect("price");
        assert_eq!(first.symbol, "BTC/USD");
        assert!((first.price - 42500.50).abs() < 1e-10);

        let second = service.crypto_price("BTC", "USD").await.expect("cached");
        assert!((second.price - 42500.50).abs() < 1e-10);

        assert_eq!(service.provider.rate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.cache_stats().entries, vec!["BTC-USD".to_string()]);
    }

    #[tokio::test]
    async fn stock_and_crypto_keys_do_not_collide() {
        let provider = MockProvider {
            quote_price: Some(1.0),
            rate_price: Some(2.0),
            ..Default::default()
        };
        let service = MarketDataService::new(provider);

        service.stock_price("BTC").await.unwrap();
        let crypto = service.crypto_price("BTC", "USD").await.unwrap();
        assert!((crypto.price - 2.0).abs() < 1e-10);

        let mut keys = service.cache_stats().entries;
        keys.sort();
        assert_eq!(keys, vec!["BTC".to_string(), "BTC-USD".to_string()]);
    }

    #[tokio::test]
    async fn batch_drops_failures_silently() {
        // The mock fails every quote; batch must yield an empty result, not
        // an error.
        let service = MarketDataService::new(MockProvider::default());
        let result = service.stock_prices_batch(&["AAPL", "MSFT", "GOOG"]).await;
        assert!(result.is_empty());

        let service = MarketDataService::new(MockProvider::with_quote(50.0));
        let result = service.stock_prices_batch(&["AAPL", "MSFT"]).await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn time_series_failure_collapses_to_none() {
        let service = MarketDataService::new(MockProvider::default());
        assert!(service.stock_time_series("AAPL", false).await.is_none());
    }

    #[tokio::test]
    async fn intraday_series_failure_collapses_to_none() {
        let service = MarketDataService::new(MockProvider::default());
        assert!(service
            .stock_intraday_series("AAPL", IntradayInterval::default())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn intraday_series_passes_bars_through() {
        let service = MarketDataService::new(MockProvider::with_bars(vec![
            bar("2026-08-28 09:00:00"),
            bar("2026-08-28 10:00:00"),
        ]));

        let bars = service
            .stock_intraday_series("aapl", IntradayInterval::Min60)
            .await
            .expect("bars");
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, "2026-08-28 09:00:00");
    }

    #[tokio::test]
    async fn clear_cache_then_stats_reports_empty() {
        let service = MarketDataService::new(MockProvider::with_quote(189.5));
        service.stock_price("AAPL").await.unwrap();
        assert_eq!(service.cache_stats().size, 1);

        service.clear_cache();
        assert_eq!(service.cache_stats().size, 0);
    }
}
