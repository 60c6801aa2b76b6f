//! Filesystem cache implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sectorscan_core::{CacheEntry, EngineError, ReportCache, ReportKey, Result};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Persistent cache storing each report payload as `<hash>.json` under one
/// directory.
///
/// The file modification time is the freshness timestamp; no sidecar metadata
/// is kept. Writes replace the whole file, so concurrent writers to the same
/// key settle last-writer-wins and a reader never observes a partially
/// updated entry structure. Unreadable or unparsable files count as misses.
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    /// Opens a cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| EngineError::Cache(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Path of the cache file for a key.
    #[must_use]
    pub fn path_for(&self, key: &ReportKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.cache_id()))
    }
}

#[async_trait]
impl ReportCache for FsCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &ReportKey) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("cache miss");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "unreadable cache file, treating as miss");
                return Ok(None);
            }
        };

        let payload: Value = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "corrupt cache file, treating as miss");
                return Ok(None);
            }
        };

        let stored_at = file_mtime(&path).await.unwrap_or_else(Utc::now);
        debug!("cache hit");
        Ok(Some(CacheEntry::at(payload, stored_at)))
    }

    #[instrument(skip(self, payload), fields(key = %key))]
    async fn put(&self, key: &ReportKey, payload: &Value) -> Result<()> {
        let path = self.path_for(key);
        let bytes =
            serde_json::to_vec(payload).map_err(|e| EngineError::Cache(e.to_string()))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| EngineError::Cache(format!("write {}: {e}", path.display())))?;
        debug!("cached payload");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let max_age = chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX);
        let mut removed = 0usize;

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| EngineError::Cache(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::Cache(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(mtime) = file_mtime(&path).await else {
                continue;
            };
            if Utc::now().signed_duration_since(mtime) >= max_age
                && tokio::fs::remove_file(&path).await.is_ok()
            {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("invalidated {} stale cache files", removed);
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| EngineError::Cache(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::Cache(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "failed to remove cache file");
            }
        }
        debug!("cleared cache directory");
        Ok(())
    }
}

/// File mtime as UTC, if the metadata is readable.
async fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = tokio::fs::metadata(path).await.ok()?;
    let mtime = metadata.modified().ok()?;
    Some(DateTime::<Utc>::from(mtime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorscan_core::ReportType;
    use serde_json::json;

    fn key(symbol: &str) -> ReportKey {
        ReportKey::new(ReportType::Overview, symbol)
    }

    #[tokio::test]
    async fn roundtrips_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = key("AAPL");

        assert!(cache.get(&key).await.unwrap().is_none());

        let payload = json!({"Symbol": "AAPL", "PERatio": "28.5"});
        cache.put(&key, &payload).await.unwrap();

        let entry = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(entry.payload, payload);
        assert!(entry.is_fresh(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn file_name_is_the_cache_id() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = key("AAPL");

        cache.put(&key, &json!({})).await.unwrap();
        let expected = dir.path().join(format!("{}.json", key.cache_id()));
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn overwrite_replaces_entry_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = key("AAPL");

        cache.put(&key, &json!({"v": 1, "old": true})).await.unwrap();
        cache.put(&key, &json!({"v": 2})).await.unwrap();

        let entry = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(entry.payload, json!({"v": 2}));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = key("AAPL");

        tokio::fs::write(cache.path_for(&key), b"{not json")
            .await
            .unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let overview = ReportKey::new(ReportType::Overview, "AAPL");
        let income = ReportKey::new(ReportType::IncomeStatement, "AAPL");

        cache.put(&overview, &json!({"kind": "overview"})).await.unwrap();
        cache.put(&income, &json!({"kind": "income"})).await.unwrap();

        let entry = cache.get(&overview).await.unwrap().unwrap();
        assert_eq!(entry.payload, json!({"kind": "overview"}));
        let entry = cache.get(&income).await.unwrap().unwrap();
        assert_eq!(entry.payload, json!({"kind": "income"}));
    }

    #[tokio::test]
    async fn clear_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = key("AAPL");

        cache.put(&key, &json!({"v": 1})).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalidate_stale_keeps_fresh_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCache::new(dir.path()).unwrap();
        let key = key("AAPL");

        cache.put(&key, &json!({"v": 1})).await.unwrap();
        // Just written, so nothing is older than a generous TTL.
        let removed = cache.invalidate_stale(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(removed, 0);
        assert!(cache.get(&key).await.unwrap().is_some());

        // A zero TTL makes everything stale.
        let removed = cache.invalidate_stale(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get(&key).await.unwrap().is_none());
    }
}
