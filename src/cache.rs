//! Time-bounded series cache keyed by query fingerprint.
//!
//! Entries expire when `now - stored_at > ttl`. Expired entries are not evicted;
//! reads treat them as misses and the next `set` overwrites them. The store is
//! `Send + Sync` and may be shared between sessions behind an `Arc`.

use crate::clock::{Clock, SystemClock};
use crate::domain::market_data::{DailyRecord, QueryDescriptor};

use async_lock::RwLock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default freshness window for cached series.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    series: Vec<DailyRecord>,
    stored_at: DateTime<Utc>,
}

pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: CACHE_TTL,
            clock,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored series, if present and no older than the TTL.
    pub async fn get(&self, key: &str) -> Option<Vec<DailyRecord>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        // A stamp from the future (clock moved backwards) counts as fresh.
        let age = (self.clock.now() - entry.stored_at).to_std().unwrap_or_default();
        if age <= self.ttl {
            tracing::debug!(age_ms = age.as_millis() as u64, "Cache hit");
            Some(entry.series.clone())
        } else {
            tracing::debug!(age_ms = age.as_millis() as u64, "Cache entry expired");
            None
        }
    }

    /// Overwrite the entry for `key`, stamped now.
    pub async fn set(&self, key: impl Into<String>, series: Vec<DailyRecord>) {
        let entry = CacheEntry {
            series,
            stored_at: self.clock.now(),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    pub async fn get_query(&self, query: &QueryDescriptor) -> Option<Vec<DailyRecord>> {
        self.get(&query.cache_key()).await
    }

    pub async fn set_query(&self, query: &QueryDescriptor, series: Vec<DailyRecord>) {
        self.set(query.cache_key(), series).await
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
