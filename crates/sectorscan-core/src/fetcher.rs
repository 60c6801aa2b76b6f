//! Trait for the single-shot remote report fetcher.

use async_trait::async_trait;

use crate::{outcome::FetchOutcome, report::ReportKey};

/// Single-shot remote fetch primitive.
///
/// One call issues exactly one network request and classifies the response.
/// Retry and cache-fallback policy live in the resolver, not here; a fetcher
/// is only responsible for classification and for writing successful payloads
/// to the cache.
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    /// Short name of the remote source, used in logs.
    fn name(&self) -> &str;

    /// Fetches one report and classifies the response.
    async fn fetch(&self, key: &ReportKey) -> FetchOutcome;
}
