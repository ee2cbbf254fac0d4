//! Mutable per-index search settings
//!
//! Settings live as long as their coordinator and are never persisted.

use crate::constants::{DEFAULT_THREADS_PER_SHARD, MAX_THREADS_PER_SHARD};
use crate::error::FederexError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Snapshot of the settings of one index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    /// Worker threads per shard
    pub threads_per_shard: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            threads_per_shard: DEFAULT_THREADS_PER_SHARD,
        }
    }
}

/// Validate a caller-supplied threads-per-shard value
///
/// Values arrive as signed integers from the request surface so that
/// non-positive input can be rejected with a client error instead of wrapping.
pub fn validate_threads_per_shard(value: i64) -> Result<usize, FederexError> {
    if value <= 0 {
        return Err(FederexError::invalid_argument(
            "threads_per_shard",
            format!("must be positive, got {}", value),
            "Set threads_per_shard to an integer >= 1",
        ));
    }

    match usize::try_from(value) {
        Ok(threads) if threads <= MAX_THREADS_PER_SHARD => Ok(threads),
        _ => Err(FederexError::invalid_argument(
            "threads_per_shard",
            format!("{} exceeds the maximum of {}", value, MAX_THREADS_PER_SHARD),
            format!("Set threads_per_shard between 1 and {}", MAX_THREADS_PER_SHARD),
        )),
    }
}

/// Concurrent store for one index's settings
#[derive(Debug, Default)]
pub struct SettingsStore {
    inner: RwLock<SearchSettings>,
}

impl SettingsStore {
    /// Create a store holding the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Current settings snapshot
    pub fn snapshot(&self) -> SearchSettings {
        *self.inner.read()
    }

    /// Current threads-per-shard value
    pub fn threads_per_shard(&self) -> usize {
        self.inner.read().threads_per_shard
    }

    /// Validate and store a new threads-per-shard value
    ///
    /// Returns the previous value. On validation failure the stored value is
    /// left untouched.
    pub fn set_threads_per_shard(&self, value: i64) -> Result<usize, FederexError> {
        self.update_threads_per_shard(value, |_| {})
    }

    /// Validate and store a new value, running `apply` before the write lock
    /// is released
    ///
    /// `apply` receives the new value. Concurrent updates run their `apply`
    /// in the same order as they store, so whatever `apply` derives from the
    /// value ends up matching the last stored one.
    pub fn update_threads_per_shard(&self, value: i64, apply: impl FnOnce(usize)) -> Result<usize, FederexError> {
        let threads = validate_threads_per_shard(value)?;
        let mut settings = self.inner.write();
        let previous = settings.threads_per_shard;
        settings.threads_per_shard = threads;
        apply(threads);
        Ok(previous)
    }
}
