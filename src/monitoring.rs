//! Search metrics for a coordinator
//!
//! Counters are plain atomics so that concurrent searches can record their
//! outcome without contending on a lock.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters updated by every search
#[derive(Debug, Default)]
pub struct SearchMetrics {
    searches: AtomicU64,
    shard_tasks: AtomicU64,
    shard_failures: AtomicU64,
    shard_timeouts: AtomicU64,
    total_latency_us: AtomicU64,
    last_latency_us: AtomicU64,
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMetricsSnapshot {
    /// Completed search requests
    pub searches: u64,
    /// Shard tasks dispatched
    pub shard_tasks: u64,
    /// Shard tasks that failed with an error
    pub shard_failures: u64,
    /// Shard tasks that exceeded their deadline
    pub shard_timeouts: u64,
    /// Latency of the most recent search
    pub last_latency: Duration,
    /// Mean latency over all searches
    pub average_latency: Duration,
}

impl SearchMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record shard tasks being dispatched
    pub fn record_dispatch(&self, tasks: usize) {
        self.shard_tasks.fetch_add(tasks as u64, Ordering::Relaxed);
    }

    /// Record a failed shard task
    pub fn record_shard_failure(&self) {
        self.shard_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a shard task that hit its deadline
    pub fn record_shard_timeout(&self) {
        self.shard_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed search request
    pub fn record_search(&self, latency: Duration) {
        let micros = latency.as_micros().min(u64::MAX as u128) as u64;
        self.searches.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(micros, Ordering::Relaxed);
        self.last_latency_us.store(micros, Ordering::Relaxed);
    }

    /// Take a snapshot of the counters
    pub fn snapshot(&self) -> SearchMetricsSnapshot {
        let searches = self.searches.load(Ordering::Relaxed);
        let total = self.total_latency_us.load(Ordering::Relaxed);
        let average = if searches == 0 { 0 } else { total / searches };

        SearchMetricsSnapshot {
            searches,
            shard_tasks: self.shard_tasks.load(Ordering::Relaxed),
            shard_failures: self.shard_failures.load(Ordering::Relaxed),
            shard_timeouts: self.shard_timeouts.load(Ordering::Relaxed),
            last_latency: Duration::from_micros(self.last_latency_us.load(Ordering::Relaxed)),
            average_latency: Duration::from_micros(average),
        }
    }
}
