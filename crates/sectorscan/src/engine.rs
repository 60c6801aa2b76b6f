//! Engine configuration and wiring façade.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sectorscan_alphavantage::AlphaVantageFetcher;
use sectorscan_cache::FsCache;
use sectorscan_core::{
    DEFAULT_TTL, EngineError, ReportCache, ReportKey, ReportType, Result, RetryPolicy,
    SectorUniverse, Symbol, SymbolUniverseResult,
};
use tracing::info;

use crate::aggregator::SymbolAggregator;
use crate::progress::{NoProgress, ProgressSink};
use crate::resolver::ReportResolver;
use crate::scheduler::{DEFAULT_CONCURRENCY, UniverseScheduler};

/// Engine configuration.
#[derive(Clone)]
pub struct EngineConfig {
    /// API key for the remote financial-data source.
    pub api_key: String,
    /// Endpoint base URL override; the fetcher's default when `None`.
    pub base_url: Option<String>,
    /// Directory holding the on-disk report cache.
    pub cache_dir: PathBuf,
    /// Cache time-to-live, shared by all report types.
    pub ttl: Duration,
    /// Bounded worker-pool size.
    pub concurrency: usize,
    /// Retry policy for throttled or failing fetches.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("cache_dir", &self.cache_dir)
            .field("ttl", &self.ttl)
            .field("concurrency", &self.concurrency)
            .field("retry", &self.retry)
            .finish()
    }
}

impl EngineConfig {
    /// Creates a config with defaults: 24 h TTL, 10 workers, three fetch
    /// attempts spaced one second apart.
    #[must_use]
    pub fn new(api_key: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            cache_dir: cache_dir.into(),
            ttl: DEFAULT_TTL,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the endpoint base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overrides the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Overrides the worker-pool size.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Wires the cache, fetcher, resolver, aggregator and scheduler together.
#[derive(Debug)]
pub struct Engine {
    resolver: Arc<ReportResolver>,
    scheduler: UniverseScheduler,
}

impl Engine {
    /// Builds an engine backed by the on-disk cache and the remote fetcher.
    ///
    /// # Errors
    /// Returns an error if the cache directory cannot be created.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let cache: Arc<dyn ReportCache> = Arc::new(FsCache::new(config.cache_dir)?);
        let mut fetcher = AlphaVantageFetcher::new(config.api_key, Arc::clone(&cache));
        if let Some(base_url) = config.base_url {
            fetcher = fetcher.with_base_url(base_url);
        }
        let resolver = Arc::new(
            ReportResolver::new(Arc::new(fetcher), cache)
                .with_ttl(config.ttl)
                .with_retry(config.retry),
        );
        let aggregator = Arc::new(SymbolAggregator::new(Arc::clone(&resolver)));
        let scheduler =
            UniverseScheduler::new(aggregator).with_concurrency(config.concurrency);
        Ok(Self { resolver, scheduler })
    }

    /// Runs the engine over `symbols` without progress reporting.
    pub async fn run(&self, symbols: &[Symbol], force_refresh: bool) -> SymbolUniverseResult {
        self.run_with_progress(symbols, force_refresh, Arc::new(NoProgress))
            .await
    }

    /// Runs the engine over `symbols`, reporting completion counts to
    /// `progress` as symbol tasks finish.
    pub async fn run_with_progress(
        &self,
        symbols: &[Symbol],
        force_refresh: bool,
        progress: Arc<dyn ProgressSink>,
    ) -> SymbolUniverseResult {
        info!(symbols = symbols.len(), force_refresh, "starting universe run");
        self.scheduler.run(symbols, force_refresh, progress).await
    }

    /// Runs the engine over every symbol in the universe.
    pub async fn run_universe(
        &self,
        universe: &SectorUniverse,
        force_refresh: bool,
    ) -> SymbolUniverseResult {
        self.run(&universe.symbols(), force_refresh).await
    }

    /// Force-refreshes all four reports for one symbol.
    ///
    /// Returns the report types that resolved with data.
    pub async fn refresh_symbol(&self, symbol: &Symbol) -> Vec<ReportType> {
        let mut refreshed = Vec::new();
        for report_type in ReportType::ALL {
            let key = ReportKey::new(report_type, symbol.clone());
            if self.resolver.resolve(&key, true).await.is_success() {
                refreshed.push(report_type);
            }
        }
        info!(symbol = %symbol, refreshed = refreshed.len(), "symbol refresh complete");
        refreshed
    }

    /// Force-refreshes every symbol of one sector sequentially.
    ///
    /// Returns the number of symbols refreshed.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidParameter`] when the sector is not part
    /// of the universe.
    pub async fn refresh_sector(
        &self,
        universe: &SectorUniverse,
        sector: &str,
    ) -> Result<usize> {
        let symbols = universe.sector_symbols(sector).ok_or_else(|| {
            EngineError::InvalidParameter(format!("unknown sector: {sector}"))
        })?;
        for symbol in symbols {
            self.refresh_symbol(symbol).await;
        }
        Ok(symbols.len())
    }
}
