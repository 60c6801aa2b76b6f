#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/sectorscan/sectorscan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache backends for the sector fundamentals engine.
//!
//! This crate provides implementations of the [`ReportCache`] trait from
//! `sectorscan-core`:
//!
//! - [`FsCache`] - Persistent filesystem cache, one JSON file per report key (default)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// Filesystem cache implementation.
pub mod fs;
/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use sectorscan_core::ReportCache;

// Re-export implementations
pub use fs::FsCache;
pub use memory::InMemoryCache;
pub use noop::NoopCache;
