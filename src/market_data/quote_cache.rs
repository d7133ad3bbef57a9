// =============================================================================
// Price Quote Cache — read-time TTL expiry
// =============================================================================
//
// Process-wide cache of recently fetched spot prices, keyed by uppercase
// ticker symbol (equities) or composite `SYMBOL-MARKET` pair (crypto).
// Entries are never updated in place — a write always replaces — and nothing
// evicts proactively: staleness is evaluated when an entry is read, and a
// stale read behaves exactly like a miss.
//
// The cache is an explicit, constructible object rather than a module-level
// singleton so tests can hold independent instances and set their own TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

/// How long a cached price stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// A price served from the cache.
#[derive(Debug, Clone)]
pub struct CachedPrice {
    /// Display symbol as stored at insert time (e.g. "AAPL" or "BTC/USD").
    pub symbol: String,
    pub price: f64,
    /// Wall-clock time of the original upstream fetch.
    pub fetched_at: DateTime<Utc>,
}

/// Snapshot of cache contents for observability and test isolation.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<String>,
}

struct CacheEntry {
    symbol: String,
    price: f64,
    fetched_at: DateTime<Utc>,
    inserted_at: Instant,
}

/// TTL cache over `parking_lot::RwLock<HashMap>`.  Concurrent reads are
/// cheap; racing writers for the same key are tolerated last-write-wins,
/// since both are storing equally fresh data.
pub struct PriceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl PriceCache {
    /// Create a cache with the standard 60-second freshness window.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with an explicit freshness window.  Tests use a zero
    /// TTL to exercise expiry without sleeping.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a fresh entry.  An entry whose age has reached the TTL is a
    /// miss; it stays in the map until the next write replaces it.
    pub fn get(&self, key: &str) -> Option<CachedPrice> {
        let map = self.entries.read();
        let entry = map.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            debug!(key, "cache entry stale — treating as miss");
            return None;
        }
        Some(CachedPrice {
            symbol: entry.symbol.clone(),
            price: entry.price,
            fetched_at: entry.fetched_at,
        })
    }

    /// Store a freshly fetched price, replacing any existing entry.
    pub fn insert(&self, key: impl Into<String>, symbol: impl Into<String>, price: f64) {
        let key = key.into();
        debug!(key = %key, price, "caching price");
        self.entries.write().insert(
            key,
            CacheEntry {
                symbol: symbol.into(),
                price,
                fetched_at: Utc::now(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Wipe all entries unconditionally.  Intended for test isolation.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Current entry count and key set (freshness is not consulted here —
    /// stale entries still count until replaced or cleared).
    pub fn stats(&self) -> CacheStats {
        let map = self.entries.read();
        CacheStats {
            size: map.len(),
            entries: map.keys().cloned().collect(),
        }
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}
