//! Error types for engine operations.
//!
//! This module defines [`EngineError`], covering the failure cases that can
//! occur when fetching, caching, or aggregating report data. Per-symbol
//! failures never abort a batch; they surface as the `SymbolUnresolved`
//! variant and are collected by the scheduler.

use thiserror::Error;

use crate::types::Symbol;

/// Errors that can occur during engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Network-related errors (connection failures, timeouts, bad status).
    #[error("network error: {0}")]
    Network(String),

    /// Error decoding or navigating a payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache backend.
    #[error("cache error: {0}")]
    Cache(String),

    /// The overview report for a symbol could not be obtained from any source,
    /// so no record can be built for it.
    #[error("no usable overview for {0}")]
    SymbolUnresolved(Symbol),

    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
