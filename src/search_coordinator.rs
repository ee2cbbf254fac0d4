//! Scatter-gather search over the shards of one logical index
//!
//! A [`SearchCoordinator`] owns the provisioned shards of one index, a bounded
//! worker pool and the index's mutable settings. A search fans the query out to
//! every shard, waits for every shard task to finish, and merges the
//! successful shard lists into one ranked answer.
//!
//! # Partial failure
//!
//! A shard task that fails (searcher error, panic, or deadline expiry) is
//! logged and contributes nothing to the merge. It never fails the request and
//! is never retried, so a search returns the best ranking the remaining shards
//! can provide.
//!
//! # Latency
//!
//! Without a configured `shard_timeout_ms` a search takes as long as its
//! slowest shard, with no upper bound. With a deadline, a shard that has not
//! produced results in time (queueing for a worker included) is treated like a
//! failed shard. Its blocking work still runs to completion in the background
//! and keeps its worker slot until then.
//!
//! # Settings and pool size
//!
//! The pool is sized `shard_count * default_threads_per_shard` at construction.
//! Under [`PoolSizing::Fixed`] the per-index `threads_per_shard` setting is
//! stored and reported but does not change concurrency. Under
//! [`PoolSizing::FollowSetting`] every update resizes the pool.

use crate::catalog::IndexCatalog;
use crate::config::{CoordinatorConfig, PoolSizing};
use crate::error::FederexError;
use crate::identifiers::{IndexName, ShardOrdinal};
use crate::merge::ResultMerger;
use crate::monitoring::{SearchMetrics, SearchMetricsSnapshot};
use crate::pool::WorkerPool;
use crate::provisioner::{provision_shards, ShardProvisioner};
use crate::searcher::{search_shard, ShardSearchArgs, ShardSearcherFactory};
use crate::settings::{SearchSettings, SettingsStore};
use crate::structures::{ScoredCandidate, SearchOptions, ShardDescriptor};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Final state of one shard task
#[derive(Debug, Clone, PartialEq)]
pub enum ShardStatus {
    /// Shard returned candidates
    Ok,
    /// Shard failed; the reason is the error message
    Failed(String),
    /// Shard exceeded its deadline
    TimedOut,
}

/// Outcome of one shard task within a search
#[derive(Debug, Clone, PartialEq)]
pub struct ShardOutcome {
    pub shard: ShardOrdinal,
    pub status: ShardStatus,
    /// Candidates the shard contributed to the merge
    pub candidates: usize,
    pub elapsed: Duration,
}

/// Merged candidates plus the per-shard outcomes that produced them
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub candidates: Vec<ScoredCandidate>,
    /// One entry per shard, in ordinal order
    pub shards: Vec<ShardOutcome>,
    pub elapsed: Duration,
}

impl SearchReport {
    /// Number of shards excluded from the merge
    pub fn failed_shards(&self) -> usize {
        self.shards.iter().filter(|s| s.status != ShardStatus::Ok).count()
    }

    /// True when every shard contributed
    pub fn is_complete(&self) -> bool {
        self.failed_shards() == 0
    }
}

/// Scatter-gather coordinator for one logical index
pub struct SearchCoordinator {
    index: IndexName,
    config: CoordinatorConfig,
    shards: Vec<ShardDescriptor>,
    pool: WorkerPool,
    settings: SettingsStore,
    searcher_factory: Arc<dyn ShardSearcherFactory>,
    catalog: Arc<dyn IndexCatalog>,
    metrics: SearchMetrics,
}

impl SearchCoordinator {
    /// Provision every shard of `index` and build its coordinator
    ///
    /// Provisioning runs shard by shard in ordinal order. The first failing
    /// shard aborts construction with a `ProvisioningFailure`.
    pub async fn new(
        index: IndexName,
        config: CoordinatorConfig,
        provisioner: &dyn ShardProvisioner,
        searcher_factory: Arc<dyn ShardSearcherFactory>,
        catalog: Arc<dyn IndexCatalog>,
    ) -> Result<Self, FederexError> {
        config.validate()?;
        catalog.ensure_known(&index)?;

        info!(index = %index, shard_count = config.shard_count, "Provisioning shards for coordinator");
        let shards = provision_shards(provisioner, &index, config.shard_count).await?;

        Self::from_shards(index, config, shards, searcher_factory, catalog)
    }

    /// Build a coordinator over shards that are already provisioned
    pub fn from_shards(
        index: IndexName,
        config: CoordinatorConfig,
        shards: Vec<ShardDescriptor>,
        searcher_factory: Arc<dyn ShardSearcherFactory>,
        catalog: Arc<dyn IndexCatalog>,
    ) -> Result<Self, FederexError> {
        config.validate()?;

        if shards.len() != config.shard_count {
            return Err(FederexError::config_error(
                "shards",
                format!("expected {} shards, got {}", config.shard_count, shards.len()),
                "Provision exactly shard_count shards for the index",
            ));
        }

        let pool_size = config.initial_pool_size();
        info!(index = %index, shard_count = shards.len(), pool_size, "Search coordinator ready");

        Ok(Self {
            index,
            pool: WorkerPool::new(pool_size),
            config,
            shards,
            settings: SettingsStore::new(),
            searcher_factory,
            catalog,
            metrics: SearchMetrics::new(),
        })
    }

    /// Search every shard and return the merged top `hits` candidates
    pub async fn search(
        &self,
        query: &str,
        hits: usize,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredCandidate>, FederexError> {
        self.search_detailed(query, hits, options).await.map(|report| report.candidates)
    }

    /// Search every shard and report per-shard outcomes with the merged result
    pub async fn search_detailed(
        &self,
        query: &str,
        hits: usize,
        options: &SearchOptions,
    ) -> Result<SearchReport, FederexError> {
        if hits == 0 {
            return Err(FederexError::invalid_argument(
                "hits",
                "must be greater than 0",
                "Request at least one result",
            ));
        }

        let defaults = self
            .catalog
            .defaults(&self.index)
            .ok_or_else(|| FederexError::not_found(self.index.as_str()))?;
        let resolved = defaults.resolve(options);

        let start = Instant::now();
        let query: Arc<str> = Arc::from(query);
        let deadline = self.config.shard_timeout_duration();

        debug!(
            index = %self.index,
            shards = self.shards.len(),
            hits,
            ef_search = resolved.ef_search,
            "Dispatching shard searches"
        );
        self.metrics.record_dispatch(self.shards.len());

        let tasks = self.shards.iter().map(|shard| {
            let args = ShardSearchArgs::for_shard(shard, &resolved);
            self.run_shard_task(args, Arc::clone(&query), hits, deadline)
        });
        let results = futures::future::join_all(tasks).await;

        let mut outcomes = Vec::with_capacity(results.len());
        let mut shard_lists = Vec::with_capacity(results.len());
        for (shard, result, elapsed) in results {
            let outcome = match result {
                Ok(candidates) => {
                    let outcome = ShardOutcome {
                        shard,
                        status: ShardStatus::Ok,
                        candidates: candidates.len(),
                        elapsed,
                    };
                    shard_lists.push(candidates);
                    outcome
                }
                Err(error) => self.record_shard_error(shard, error, elapsed),
            };
            outcomes.push(outcome);
        }

        let merger = ResultMerger::new(hits).with_deduplication(self.config.deduplication_policy);
        let candidates = merger.merge(shard_lists);

        let elapsed = start.elapsed();
        self.metrics.record_search(elapsed);
        debug!(
            index = %self.index,
            returned = candidates.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Merged shard results"
        );

        Ok(SearchReport {
            candidates,
            shards: outcomes,
            elapsed,
        })
    }

    /// Run one shard search on the worker pool
    async fn run_shard_task(
        &self,
        args: ShardSearchArgs,
        query: Arc<str>,
        hits: usize,
        deadline: Option<Duration>,
    ) -> (ShardOrdinal, Result<Vec<ScoredCandidate>, FederexError>, Duration) {
        let started = Instant::now();
        let shard = args.shard;

        let work = async {
            let permit = self.pool.acquire().await?;
            let factory = Arc::clone(&self.searcher_factory);

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                search_shard(factory.as_ref(), &args, &query, hits)
            });

            handle.await.unwrap_or_else(|e| {
                Err(FederexError::shard_search_failure(
                    shard.get(),
                    format!("shard task aborted: {}", e),
                ))
            })
        };

        let result = match deadline {
            Some(timeout) => tokio::time::timeout(timeout, work).await.unwrap_or_else(|_| {
                Err(FederexError::ShardTimeout {
                    shard: shard.get(),
                    timeout,
                })
            }),
            None => work.await,
        };

        (shard, result, started.elapsed())
    }

    fn record_shard_error(&self, shard: ShardOrdinal, error: FederexError, elapsed: Duration) -> ShardOutcome {
        let status = match error {
            FederexError::ShardTimeout { timeout, .. } => {
                warn!(
                    index = %self.index,
                    shard = shard.get(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Shard search timed out, excluding shard from results"
                );
                self.metrics.record_shard_timeout();
                ShardStatus::TimedOut
            }
            other => {
                warn!(
                    index = %self.index,
                    shard = shard.get(),
                    error = %other,
                    "Shard search failed, excluding shard from results"
                );
                self.metrics.record_shard_failure();
                ShardStatus::Failed(other.to_string())
            }
        };

        ShardOutcome {
            shard,
            status,
            candidates: 0,
            elapsed,
        }
    }

    /// Current threads-per-shard setting
    pub fn threads_per_shard(&self) -> usize {
        self.settings.threads_per_shard()
    }

    /// Validate and store a new threads-per-shard setting
    ///
    /// Values outside `1..=MAX_THREADS_PER_SHARD` fail with `InvalidArgument`
    /// and leave the setting unchanged.
    pub fn set_threads_per_shard(&self, value: i64) -> Result<(), FederexError> {
        let mut threads = 0;
        // Resize while the setting is still locked so pool and setting agree
        let previous = self.settings.update_threads_per_shard(value, |stored| {
            threads = stored;
            if self.config.pool_sizing == PoolSizing::FollowSetting {
                self.pool.resize(self.config.pool_size_for(stored));
            }
        })?;

        info!(
            index = %self.index,
            previous,
            threads_per_shard = threads,
            pool_size = self.pool.size(),
            "Updated threads per shard"
        );
        Ok(())
    }

    /// Snapshot of this index's settings
    pub fn settings(&self) -> SearchSettings {
        self.settings.snapshot()
    }

    /// Snapshot of this coordinator's search metrics
    pub fn metrics(&self) -> SearchMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Logical index this coordinator serves
    pub fn index_name(&self) -> &IndexName {
        &self.index
    }

    /// Configuration the coordinator was built with
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Provisioned shards in ordinal order
    pub fn shards(&self) -> &[ShardDescriptor] {
        &self.shards
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Configured worker pool size
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// Worker slots not currently held by a shard task
    pub fn available_workers(&self) -> usize {
        self.pool.available()
    }
}

impl std::fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("index", &self.index)
            .field("shards", &self.shards.len())
            .field("pool_size", &self.pool.size())
            .field("settings", &self.settings.snapshot())
            .finish()
    }
}
