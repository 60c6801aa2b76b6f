//! Bounded-retry policy.
//!
//! A single policy value parameterizes every retrying call site in the
//! resolver: total attempt count and a fixed inter-attempt delay.

use std::time::Duration;

/// Bounded retry with a fixed inter-attempt delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total fetch attempts before giving up, retries included.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// Three total attempts spaced one second apart.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with `max_attempts` total attempts and `delay` between them.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            delay,
        }
    }

    /// Single-attempt policy with no delay.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}
