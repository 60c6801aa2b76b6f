//! Cache trait and entry type for stored report payloads.
//!
//! This module defines the [`ReportCache`] trait implemented by the cache
//! backends, and [`CacheEntry`], the payload-plus-timestamp pair the engine
//! uses to decide freshness.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{error::Result, report::ReportKey};

/// Default time-to-live for cached report payloads: 24 hours, all report types.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached report payload together with the time it was stored.
///
/// Entries are written whole on every successful fetch and never mutated in
/// place; a refresh replaces the entry wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    /// Raw payload as received from the remote source.
    pub payload: Value,
    /// When the payload was stored.
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stored now.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            stored_at: Utc::now(),
        }
    }

    /// Creates an entry with an explicit storage time.
    #[must_use]
    pub const fn at(payload: Value, stored_at: DateTime<Utc>) -> Self {
        Self { payload, stored_at }
    }

    /// True iff the entry is younger than `ttl`.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.stored_at);
        age < chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Trait for storing fetched report payloads keyed by [`ReportKey`].
///
/// Implementations store entries independently per key; there is no cross-key
/// transaction. Corrupt or unreadable entries are reported as absent, never as
/// an error, so the caller falls back to a remote fetch.
#[async_trait]
pub trait ReportCache: Send + Sync {
    /// Looks up the cached entry for a key. Never fetches remotely.
    async fn get(&self, key: &ReportKey) -> Result<Option<CacheEntry>>;

    /// Stores a payload for a key with the current time as its storage time,
    /// replacing any prior entry for that key wholesale.
    async fn put(&self, key: &ReportKey, payload: &Value) -> Result<()>;

    /// Removes entries older than `ttl`.
    ///
    /// Returns the number of entries removed.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached entries.
    async fn clear(&self) -> Result<()>;
}
