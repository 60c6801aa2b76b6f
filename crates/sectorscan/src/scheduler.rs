//! Bounded-parallel execution of the aggregator across a symbol universe.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sectorscan_core::{Symbol, SymbolUniverseResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::aggregator::SymbolAggregator;
use crate::progress::ProgressSink;

/// Default number of symbols processed concurrently.
///
/// Sized for the remote API's request-rate tolerance, not local resources:
/// each symbol task performs its four report fetches sequentially, so this is
/// also the bound on outstanding network calls.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Runs the aggregator across a symbol set on a bounded worker pool.
pub struct UniverseScheduler {
    aggregator: Arc<SymbolAggregator>,
    concurrency: usize,
}

impl std::fmt::Debug for UniverseScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniverseScheduler")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl UniverseScheduler {
    /// Creates a scheduler with the default concurrency limit.
    #[must_use]
    pub fn new(aggregator: Arc<SymbolAggregator>) -> Self {
        Self {
            aggregator,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Overrides the worker-pool size. Values below one clamp to one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Processes every symbol, partitioning the input into records and
    /// failures.
    ///
    /// One task runs per symbol with at most the configured number in flight;
    /// outcomes are collected in completion order and one symbol's failure or
    /// panic never aborts the batch. `progress` is invoked once per completed
    /// symbol. Records are re-sorted by symbol before returning.
    pub async fn run(
        &self,
        symbols: &[Symbol],
        force_refresh: bool,
        progress: Arc<dyn ProgressSink>,
    ) -> SymbolUniverseResult {
        let symbols = dedup(symbols);
        let total = symbols.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let mut tasks = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, Symbol> = HashMap::with_capacity(total);
        for symbol in symbols {
            let aggregator = Arc::clone(&self.aggregator);
            let semaphore = Arc::clone(&semaphore);
            let task_symbol = symbol.clone();
            let handle = tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                aggregator.build(&task_symbol, force_refresh).await
            });
            pending.insert(handle.id(), symbol);
        }

        let mut result = SymbolUniverseResult::default();
        let mut completed = 0usize;
        while let Some(joined) = tasks.join_next_with_id().await {
            completed += 1;
            match joined {
                Ok((id, outcome)) => {
                    let Some(symbol) = pending.remove(&id) else {
                        continue;
                    };
                    match outcome {
                        Ok(record) => result.records.push(record),
                        Err(e) => {
                            warn!(symbol = %symbol, error = %e, "symbol failed");
                            result.failed.insert(symbol);
                        }
                    }
                }
                Err(join_error) => {
                    if let Some(symbol) = pending.remove(&join_error.id()) {
                        warn!(symbol = %symbol, error = %join_error, "symbol task aborted");
                        result.failed.insert(symbol);
                    }
                }
            }
            progress.on_progress(completed, total);
        }

        result.records.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        if result.is_total_failure() {
            warn!(failed = result.failed.len(), "no symbol produced a record");
        } else {
            info!(
                records = result.records.len(),
                failed = result.failed.len(),
                "universe run complete"
            );
        }
        result
    }
}

/// Order-preserving dedup of the input symbols.
fn dedup(symbols: &[Symbol]) -> Vec<Symbol> {
    let mut seen = HashSet::with_capacity(symbols.len());
    symbols
        .iter()
        .filter(|symbol| seen.insert((*symbol).clone()))
        .cloned()
        .collect()
}
