//! In-memory cache implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sectorscan_core::{CacheEntry, ReportCache, ReportKey, Result};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory cache for testing and development.
///
/// Entries are stored in an `RwLock`-protected `HashMap` and are lost when
/// the cache is dropped. Payloads are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<ReportKey, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a payload with an explicit storage time.
    ///
    /// Lets TTL behavior be exercised without waiting out a real TTL.
    pub async fn put_at(&self, key: &ReportKey, payload: &Value, stored_at: DateTime<Utc>) {
        self.entries
            .write()
            .await
            .insert(key.clone(), CacheEntry::at(payload.clone(), stored_at));
    }
}

#[async_trait]
impl ReportCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &ReportKey) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => {
                debug!("cache hit");
                Ok(Some(entry.clone()))
            }
            None => {
                debug!("cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, payload), fields(key = %key))]
    async fn put(&self, key: &ReportKey, payload: &Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.clone(), CacheEntry::new(payload.clone()));
        debug!("cached payload");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(ttl));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("invalidated {} stale cache entries", removed);
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        debug!("cleared all cache entries");
        Ok(())
    }
}
