pub mod history;
pub mod provider;
pub mod quote_cache;
pub mod service;

// Re-export the main entry points (e.g. `use crate::market_data::MarketDataService`).
pub use history::{filter_by_date_range, generate_mock_price_history};
pub use provider::{AlphaVantageClient, IntradayInterval, Quote, QuoteProvider, SeriesBar};
pub use quote_cache::{CacheStats, PriceCache, DEFAULT_TTL};
pub use service::{MarketDataService, PriceData};
