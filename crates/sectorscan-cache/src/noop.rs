//! No-op cache implementation.

use std::time::Duration;

use async_trait::async_trait;
use sectorscan_core::{CacheEntry, ReportCache, ReportKey, Result};
use serde_json::Value;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `Ok(None)` and `put` returns `Ok(())`. Useful for
/// disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportCache for NoopCache {
    async fn get(&self, _key: &ReportKey) -> Result<Option<CacheEntry>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _key: &ReportKey, _payload: &Value) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorscan_core::ReportType;
    use serde_json::json;

    #[tokio::test]
    async fn stores_nothing() {
        let cache = NoopCache::new();
        let key = ReportKey::new(ReportType::Overview, "AAPL");

        cache.put(&key, &json!({"v": 1})).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());

        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 0);
        assert!(cache.clear().await.is_ok());
    }

    #[test]
    fn is_copy() {
        let cache1 = NoopCache::new();
        let cache2 = cache1;
        let _cache3 = cache2;
    }
}
