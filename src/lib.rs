//! Federex - scatter-gather search over sharded indexes
//!
//! A logical index is partitioned into a fixed number of shards, each searched
//! independently by a pluggable per-shard searcher. Federex provisions the
//! shards of an index on first use, fans every query out to all shards on a
//! bounded worker pool, tolerates individual shard failures, and merges the
//! per-shard rankings into one top-k list.
//!
//! The entry points are [`CoordinatorRegistry`] for async callers and the
//! [`api`] operations for synchronous ones.

pub mod api;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod deduplication;
pub mod error;
pub mod identifiers;
pub mod merge;
pub mod monitoring;
pub mod pool;
pub mod provisioner;
pub mod registry;
pub mod search_coordinator;
pub mod searcher;
pub mod settings;
pub mod structures;

#[cfg(test)]
pub mod test_utils;

pub use catalog::{IndexCatalog, IndexDefaults, ResolvedOptions, StaticIndexCatalog};
pub use config::{CoordinatorConfig, PoolSizing};
pub use deduplication::{DeduplicationPolicy, DeduplicationStats, ResultDeduplicator};
pub use error::FederexError;
pub use identifiers::{IndexName, ShardOrdinal};
pub use merge::{merge_top_k, ResultMerger};
pub use monitoring::{SearchMetrics, SearchMetricsSnapshot};
pub use provisioner::{LocalShardProvisioner, ShardProvisioner};
pub use registry::CoordinatorRegistry;
pub use search_coordinator::{SearchCoordinator, SearchReport, ShardOutcome, ShardStatus};
pub use searcher::{ShardSearchArgs, ShardSearcher, ShardSearcherFactory};
pub use settings::SearchSettings;
pub use structures::{ScoredCandidate, SearchOptions, ShardDescriptor};

/// Type alias for Results using FederexError
pub type Result<T> = std::result::Result<T, FederexError>;
