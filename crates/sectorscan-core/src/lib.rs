#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/sectorscan/sectorscan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the sector fundamentals engine.
//!
//! This crate provides the foundational abstractions shared by the cache
//! backends, the remote fetcher, and the aggregation engine:
//!
//! - [`ReportKey`](report::ReportKey) / [`ReportType`](report::ReportType) - Cache addressing per report
//! - [`FetchOutcome`](outcome::FetchOutcome) - Classified result of one fetch
//! - [`ReportCache`](cache::ReportCache) - Caching abstraction
//! - [`ReportFetcher`](fetcher::ReportFetcher) - Single-shot remote fetch primitive
//! - [`SymbolRecord`](types::SymbolRecord) - Flat per-symbol output row
//! - [`RetryPolicy`](retry::RetryPolicy) - Bounded retry shared by all call sites

/// Cache trait and entry type for stored report payloads.
pub mod cache;
/// Defensive numeric coercion for remote payload fields.
pub mod coerce;
/// Error types for engine operations.
pub mod error;
/// Trait for the single-shot remote report fetcher.
pub mod fetcher;
/// Classified result of one report fetch.
pub mod outcome;
/// Report categories and cache addressing keys.
pub mod report;
/// Bounded-retry policy.
pub mod retry;
/// Core data types (Symbol, SymbolRecord, universes).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{CacheEntry, DEFAULT_TTL, ReportCache};
pub use error::{EngineError, Result};
pub use fetcher::ReportFetcher;
pub use outcome::FetchOutcome;
pub use report::{ReportKey, ReportType};
pub use retry::RetryPolicy;
pub use types::{
    BalanceQuarter, IncomeQuarter, SectorUniverse, Symbol, SymbolRecord, SymbolUniverseResult,
};
