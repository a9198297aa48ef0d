//! Time-bounded caching of upstream market data
//!
//! Each [`TtlCache`] maps a [`CacheKey`] to a slot guarded by its own async
//! mutex. The lock is held while a missing or stale entry is fetched, so
//! concurrent callers asking for the same key wait for one fetch instead of
//! issuing their own, while other keys proceed independently.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use analyst_core::{CompanyInfo, FinancialStatementSet, PriceSeries};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::MarketConfig;

/// Cache key for upstream requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Ticker, company identifier or listing name
    pub subject: String,
    /// Operation the payload came from
    pub endpoint: String,
    /// Additional parameters as JSON string
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(
        subject: impl Into<String>,
        endpoint: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            subject: subject.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

type Slot<V> = Arc<Mutex<Option<CacheEntry<V>>>>;

/// Per-key memoization with a time-to-live
///
/// An entry is stale once its age exceeds the TTL. A failed fetch leaves the
/// previous entry (if any) in place and hands the error to the caller.
pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: Arc<DashMap<CacheKey, Slot<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create a new cache with the given default TTL
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value or fetch it, using the cache's own TTL
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_fetch_with_ttl(key, self.ttl, fetcher).await
    }

    /// Return the cached value or fetch it
    ///
    /// `fetcher` runs only when no entry exists for `key` or the entry is
    /// older than `ttl`. The stored timestamp is updated on every successful
    /// fetch.
    pub async fn get_or_fetch_with_ttl<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        fetcher: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() <= ttl {
                debug!("Cache hit in {} for key: {:?}", self.name, key);
                return Ok(cached.value.clone());
            }
            debug!("Stale entry in {} for key: {:?}", self.name, key);
        } else {
            debug!("Cache miss in {} for key: {:?}", self.name, key);
        }

        let value = fetcher().await?;
        *entry = Some(CacheEntry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Fresh cached value, if any
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let slot = self.existing_slot(key)?;
        let entry = slot.lock().await;
        entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() <= self.ttl)
            .map(|cached| cached.value.clone())
    }

    /// When the entry for `key` was last fetched, stale or not
    pub async fn fetched_at(&self, key: &CacheKey) -> Option<Instant> {
        let slot = self.existing_slot(key)?;
        let entry = slot.lock().await;
        entry.as_ref().map(|cached| cached.fetched_at)
    }

    /// Invalidate a specific cache entry
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of keys holding a value
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = self
            .entries
            .iter()
            .map(|item| Arc::clone(item.value()))
            .collect();

        let mut populated = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                populated += 1;
            }
        }
        populated
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // The map guard is released before the caller awaits the slot lock.
    fn slot(&self, key: &CacheKey) -> Slot<V> {
        Arc::clone(self.entries.entry(key.clone()).or_default().value())
    }

    fn existing_slot(&self, key: &CacheKey) -> Option<Slot<V>> {
        self.entries.get(key).map(|item| Arc::clone(item.value()))
    }
}

/// The three upstream caches, each with its own TTL
#[derive(Clone)]
pub struct MarketDataCache {
    /// Company listing, rarely changes
    pub companies: TtlCache<Vec<CompanyInfo>>,
    /// Quote history per ticker and date range
    pub quotes: TtlCache<PriceSeries>,
    /// Statement bundle per company identifier
    pub statements: TtlCache<FinancialStatementSet>,
}

impl MarketDataCache {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            companies: TtlCache::new("companies", config.company_ttl),
            quotes: TtlCache::new("quotes", config.quote_ttl),
            statements: TtlCache::new("statements", config.statement_ttl),
        }
    }

    /// Clear all caches
    pub fn clear_all(&self) {
        self.companies.clear();
        self.quotes.clear();
        self.statements.clear();
    }
}
