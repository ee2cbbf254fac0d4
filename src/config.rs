//! Configuration structures for Federex
//!
//! This module provides the coordinator configuration, including parameter
//! validation, builder methods and loading from a JSON file.

use crate::constants::{DEFAULT_SHARD_COUNT, DEFAULT_THREADS_PER_SHARD, MAX_THREADS_PER_SHARD};
use crate::deduplication::DeduplicationPolicy;
use crate::error::FederexError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How the worker pool reacts to changes of the per-index threads setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSizing {
    /// Pool stays at `shard_count * default_threads_per_shard` for the life of
    /// the coordinator; the threads setting is informational only
    #[default]
    Fixed,
    /// Pool is resized to `shard_count * threads_per_shard` on every update
    FollowSetting,
}

/// Configuration for a search coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Number of shards every index is partitioned into
    pub shard_count: usize,
    /// Threads per shard used to size the worker pool
    pub default_threads_per_shard: usize,
    /// Deadline for a single shard search in milliseconds; `None` waits forever
    pub shard_timeout_ms: Option<u64>,
    /// Worker pool resizing policy
    pub pool_sizing: PoolSizing,
    /// Duplicate handling when merging shard results
    pub deduplication_policy: DeduplicationPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            default_threads_per_shard: DEFAULT_THREADS_PER_SHARD,
            shard_timeout_ms: None,
            pool_sizing: PoolSizing::default(),
            deduplication_policy: DeduplicationPolicy::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards
    pub fn shard_count(mut self, count: usize) -> Self {
        self.shard_count = count;
        self
    }

    /// Set the threads per shard used to size the worker pool
    pub fn default_threads_per_shard(mut self, threads: usize) -> Self {
        self.default_threads_per_shard = threads;
        self
    }

    /// Set a deadline for each shard search
    ///
    /// Sub-millisecond deadlines round up to one millisecond.
    pub fn shard_timeout(mut self, timeout: Duration) -> Self {
        let millis = if timeout.is_zero() {
            0
        } else {
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1)
        };
        self.shard_timeout_ms = Some(millis);
        self
    }

    /// Set the worker pool resizing policy
    pub fn pool_sizing(mut self, sizing: PoolSizing) -> Self {
        self.pool_sizing = sizing;
        self
    }

    /// Set the duplicate handling policy for merged results
    pub fn deduplication_policy(mut self, policy: DeduplicationPolicy) -> Self {
        self.deduplication_policy = policy;
        self
    }

    /// Deadline for a single shard search, if any
    pub fn shard_timeout_duration(&self) -> Option<Duration> {
        self.shard_timeout_ms.map(Duration::from_millis)
    }

    /// Number of worker pool permits for a given threads-per-shard value
    pub fn pool_size_for(&self, threads_per_shard: usize) -> usize {
        self.shard_count.saturating_mul(threads_per_shard)
    }

    /// Number of worker pool permits at construction time
    pub fn initial_pool_size(&self) -> usize {
        self.pool_size_for(self.default_threads_per_shard)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), FederexError> {
        if self.shard_count == 0 {
            return Err(FederexError::config_error(
                "shard_count",
                "must be greater than 0",
                "Set shard_count to the number of prebuilt shards of each index (default: 10)",
            ));
        }

        if self.shard_count > 100 {
            return Err(FederexError::config_error(
                "shard_count",
                format!("value {} exceeds the two-digit shard naming scheme", self.shard_count),
                "Shard names are formatted as <index>-shardNN; use at most 100 shards",
            ));
        }

        if self.default_threads_per_shard == 0 {
            return Err(FederexError::config_error(
                "default_threads_per_shard",
                "must be greater than 0",
                "Set default_threads_per_shard to a positive integer (default: 4)",
            ));
        }

        if self.default_threads_per_shard > MAX_THREADS_PER_SHARD {
            return Err(FederexError::config_error(
                "default_threads_per_shard",
                format!("value {} would create an oversized worker pool", self.default_threads_per_shard),
                format!("Keep default_threads_per_shard at {} or less", MAX_THREADS_PER_SHARD),
            ));
        }

        if self.shard_timeout_ms == Some(0) {
            return Err(FederexError::config_error(
                "shard_timeout_ms",
                "must be greater than 0 when set",
                "Remove shard_timeout_ms to wait indefinitely or set a positive deadline",
            ));
        }

        Ok(())
    }

    /// Build the configuration after validation
    pub fn build(self) -> Result<Self, FederexError> {
        self.validate()?;
        Ok(self)
    }

    /// Load and validate a configuration from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FederexError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FederexError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read configuration file {}: {}", path.display(), e),
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            FederexError::Config(format!("Failed to parse configuration file {}: {}", path.display(), e))
        })?;

        config.build()
    }
}
