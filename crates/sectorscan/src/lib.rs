#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/sectorscan/sectorscan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Sector-wise stock fundamentals engine.
//!
//! This crate wires the cache backends and the remote fetcher into the
//! acquisition pipeline: the [`ReportResolver`] decides cache-or-fetch per
//! report, the [`SymbolAggregator`] merges the four reports of one symbol
//! into a [`SymbolRecord`], and the [`UniverseScheduler`] runs the aggregator
//! across the whole universe on a bounded worker pool.
//!
//! Data flows strictly upward: scheduler → aggregator → resolver →
//! (cache | fetcher). Nothing above the resolver talks to the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use sectorscan::{Engine, EngineConfig, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> sectorscan::Result<()> {
//!     let engine = Engine::new(EngineConfig::new("your_api_key", "./api_cache"))?;
//!
//!     let symbols: Vec<Symbol> = ["AAPL", "MSFT", "XOM"].map(Symbol::new).to_vec();
//!     let result = engine.run(&symbols, false).await;
//!
//!     println!("{} records, {} failed", result.records.len(), result.failed.len());
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use sectorscan_core::*;

// Cache backends
pub use sectorscan_cache::{FsCache, InMemoryCache, NoopCache};

// Remote fetcher
pub use sectorscan_alphavantage::AlphaVantageFetcher;

mod aggregator;
mod engine;
mod frame;
mod progress;
mod resolver;
mod scheduler;

pub use aggregator::SymbolAggregator;
pub use engine::{Engine, EngineConfig};
pub use frame::to_dataframe;
pub use progress::{NoProgress, ProgressSink};
pub use resolver::ReportResolver;
pub use scheduler::{DEFAULT_CONCURRENCY, UniverseScheduler};
