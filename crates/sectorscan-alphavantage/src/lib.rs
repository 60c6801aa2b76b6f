#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/sectorscan/sectorscan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage remote fetcher.
//!
//! This crate implements the `sectorscan-core` [`ReportFetcher`] trait for the
//! [Alpha Vantage](https://www.alphavantage.co/) query API.
//!
//! The API answers every request with HTTP 200 and JSON; throttling and
//! access-tier rejections arrive as an advisory message in the body instead
//! of data, so classification sniffs the body rather than the status line.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sectorscan_alphavantage::AlphaVantageFetcher;
//! use sectorscan_cache::FsCache;
//! use sectorscan_core::{ReportFetcher, ReportKey, ReportType};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = Arc::new(FsCache::new("./api_cache").unwrap());
//!     let fetcher = AlphaVantageFetcher::new("your_api_key", cache);
//!
//!     let key = ReportKey::new(ReportType::Overview, "AAPL");
//!     let outcome = fetcher.fetch(&key).await;
//!     println!("{outcome:?}");
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sectorscan_core::{FetchOutcome, ReportCache, ReportFetcher, ReportKey};
use serde_json::Value;
use tracing::{debug, warn};

/// Base URL for the Alpha Vantage query API.
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Wall-clock bound for one report request; a hang surfaces as a transport
/// error from the client rather than blocking its task indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body fields the API uses for advisory messages instead of data.
const ADVISORY_FIELDS: [&str; 3] = ["Information", "Note", "Error Message"];

/// Remote fetcher for the Alpha Vantage query API.
///
/// Issues exactly one network call per [`fetch`](ReportFetcher::fetch) and
/// classifies the response. Successful payloads are written to the report
/// cache as a side effect; throttling and access-tier advisories are never
/// cached. Retries are the resolver's responsibility.
#[derive(Clone)]
pub struct AlphaVantageFetcher {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    cache: Arc<dyn ReportCache>,
}

impl fmt::Debug for AlphaVantageFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageFetcher")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AlphaVantageFetcher {
    /// Create a fetcher with the given API key, writing payloads to `cache`.
    #[must_use]
    pub fn new(api_key: impl Into<String>, cache: Arc<dyn ReportCache>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self::with_client(client, api_key, cache)
    }

    /// Create a fetcher with a custom HTTP client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        cache: Arc<dyn ReportCache>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache,
        }
    }

    /// Override the endpoint base URL (test servers, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the query URL for a report key.
    fn url(&self, key: &ReportKey) -> String {
        format!(
            "{}?function={}&symbol={}&apikey={}",
            self.base_url,
            key.report_type.query_function(),
            key.symbol,
            self.api_key
        )
    }

    /// Classify a response body and cache the payload when it is data.
    ///
    /// Classification order: undecodable body, then rate-limit advisory, then
    /// premium advisory, then success.
    async fn classify_and_store(&self, key: &ReportKey, body: &str) -> FetchOutcome {
        let payload: Value = match serde_json::from_str(body) {
            Ok(payload) => payload,
            Err(e) => return FetchOutcome::TransportError(format!("decode: {e}")),
        };

        if let Some(advisory) = advisory_text(&payload) {
            let advisory = advisory.to_lowercase();
            if advisory.contains("limit") || advisory.contains("call frequency") {
                debug!(key = %key, "rate limit advisory");
                return FetchOutcome::RateLimited;
            }
            if advisory.contains("premium") {
                debug!(key = %key, "premium tier advisory");
                return FetchOutcome::PremiumRequired;
            }
        }

        if let Err(e) = self.cache.put(key, &payload).await {
            warn!(key = %key, error = %e, "failed to cache payload");
        }
        FetchOutcome::Success(payload)
    }
}

#[async_trait]
impl ReportFetcher for AlphaVantageFetcher {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    async fn fetch(&self, key: &ReportKey) -> FetchOutcome {
        let url = self.url(key);
        debug!(key = %key, "requesting report");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::TransportError(e.to_string()),
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited;
        }
        if !response.status().is_success() {
            return FetchOutcome::TransportError(format!("HTTP {}", response.status()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::TransportError(e.to_string()),
        };

        self.classify_and_store(key, &body).await
    }
}

/// Advisory message the API returned instead of data, if any.
fn advisory_text(payload: &Value) -> Option<&str> {
    ADVISORY_FIELDS
        .iter()
        .find_map(|field| payload.get(*field).and_then(Value::as_str))
}
