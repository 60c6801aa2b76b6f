//! Classified result of one report fetch.

use serde_json::Value;

/// Outcome of fetching or resolving a single report.
///
/// Produced per [`ReportKey`](crate::report::ReportKey); never persisted. The
/// cache only ever stores `Success` payloads, so throttling and access-tier
/// advisories cannot poison it.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// The report payload as returned by the remote source or the cache.
    Success(Value),
    /// The remote source signalled request throttling.
    RateLimited,
    /// The remote source requires a higher access tier for this report.
    PremiumRequired,
    /// Network or payload-decoding failure.
    TransportError(String),
    /// No data could be produced from either the remote source or the cache.
    Empty,
}

impl FetchOutcome {
    /// True when the outcome carries a payload.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the payload if this outcome is a success.
    #[must_use]
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }
}
