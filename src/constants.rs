//! Central constants for Federex defaults
//!
//! Single source of truth for the values that the coordinator, the request
//! layer and the configuration share.

/// Number of shards a logical index is partitioned into
pub const DEFAULT_SHARD_COUNT: usize = 10;

/// Default worker threads reserved per shard
///
/// The worker pool is sized from this constant at construction time, not from
/// the live per-index setting (see [`crate::config::PoolSizing`]).
pub const DEFAULT_THREADS_PER_SHARD: usize = 4;

/// Upper bound on threads per shard, for both configuration and live updates
pub const MAX_THREADS_PER_SHARD: usize = 256;

/// HNSW search breadth used when neither the request nor the catalog sets one
pub const DEFAULT_EF_SEARCH: usize = 100;

/// Result count used by the request layer when the caller omits `hits`
pub const DEFAULT_HITS: usize = 10;

/// Upper bound on `hits` accepted by the request layer
pub const MAX_HITS: usize = 10_000;

/// Suffix stripped from encoder and query generator class names
pub const CLASS_SUFFIX: &str = ".class";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_default_size() {
        assert_eq!(DEFAULT_SHARD_COUNT * DEFAULT_THREADS_PER_SHARD, 40);
    }

    #[test]
    fn test_largest_pool_fits_semaphore() {
        assert!(100 * MAX_THREADS_PER_SHARD <= tokio::sync::Semaphore::MAX_PERMITS);
    }

    #[test]
    fn test_hits_bounds() {
        assert!(DEFAULT_HITS > 0);
        assert!(DEFAULT_HITS <= MAX_HITS);
    }
}
