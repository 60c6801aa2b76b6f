//! Cache-or-fetch orchestration for a single report.

use std::sync::Arc;
use std::time::Duration;

use sectorscan_core::{
    CacheEntry, DEFAULT_TTL, FetchOutcome, ReportCache, ReportFetcher, ReportKey, RetryPolicy,
};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Decides, per report key, whether to serve from cache or fetch remotely.
///
/// This is the single place where staleness-tolerant degraded service is
/// decided: when the remote source is throttled or gated, the resolver
/// prefers a stale cache entry over returning nothing.
pub struct ReportResolver {
    fetcher: Arc<dyn ReportFetcher>,
    cache: Arc<dyn ReportCache>,
    ttl: Duration,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ReportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportResolver")
            .field("fetcher", &self.fetcher.name())
            .field("ttl", &self.ttl)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ReportResolver {
    /// Creates a resolver with the default 24 h TTL and retry policy.
    ///
    /// The fetcher is expected to write successful payloads to the same
    /// `cache` it is constructed with.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ReportFetcher>, cache: Arc<dyn ReportCache>) -> Self {
        Self {
            fetcher,
            cache,
            ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The cache shared with the fetcher.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ReportCache> {
        &self.cache
    }

    /// Resolves one report.
    ///
    /// A fresh cache entry is served without any network call unless
    /// `force_refresh` is set. Otherwise the fetcher runs under the retry
    /// policy: rate limits retry and then fall back to the last known entry
    /// regardless of age; premium rejections skip straight to that fallback;
    /// transport errors retry and then yield [`FetchOutcome::Empty`].
    pub async fn resolve(&self, key: &ReportKey, force_refresh: bool) -> FetchOutcome {
        if !force_refresh {
            if let Some(entry) = self.cached(key).await {
                if entry.is_fresh(self.ttl) {
                    debug!(key = %key, "serving fresh cache entry");
                    return FetchOutcome::Success(entry.payload);
                }
            }
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.fetcher.fetch(key).await {
                FetchOutcome::Success(payload) => return FetchOutcome::Success(payload),
                FetchOutcome::RateLimited => {
                    if attempt >= self.retry.max_attempts {
                        warn!(key = %key, attempt, "rate limited, falling back to cache");
                        return self.stale_or_empty(key).await;
                    }
                    debug!(key = %key, attempt, "rate limited, retrying");
                    sleep(self.retry.delay).await;
                }
                FetchOutcome::PremiumRequired => {
                    warn!(key = %key, "premium tier required, falling back to cache");
                    return self.stale_or_empty(key).await;
                }
                FetchOutcome::TransportError(cause) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(key = %key, attempt, cause = %cause, "transport failure, giving up");
                        return FetchOutcome::Empty;
                    }
                    debug!(key = %key, attempt, cause = %cause, "transport failure, retrying");
                    sleep(self.retry.delay).await;
                }
                FetchOutcome::Empty => return FetchOutcome::Empty,
            }
        }
    }

    /// Cache lookup that absorbs cache errors into a miss.
    async fn cached(&self, key: &ReportKey) -> Option<CacheEntry> {
        match self.cache.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Last known entry regardless of age, else `Empty`.
    async fn stale_or_empty(&self, key: &ReportKey) -> FetchOutcome {
        match self.cached(key).await {
            Some(entry) => {
                debug!(key = %key, "serving stale cache entry");
                FetchOutcome::Success(entry.payload)
            }
            None => FetchOutcome::Empty,
        }
    }
}
