//! FederexContext - shared state for API operations
//!
//! The context owns the coordinator registry and a small request tracker.
//! Operations borrow it mutably, the way every ApiThing operation does, but
//! the registry itself is shared so a context can be cloned per caller.
//!
//! ```rust
//! use federex::api::FederexContext;
//! use federex::catalog::StaticIndexCatalog;
//! use federex::provisioner::LocalShardProvisioner;
//! use federex::registry::CoordinatorRegistry;
//! use federex::searcher::{ShardSearchArgs, ShardSearcher, ShardSearcherFactory};
//! use federex::{CoordinatorConfig, FederexError};
//! use std::sync::Arc;
//!
//! struct NoBackend;
//!
//! impl ShardSearcherFactory for NoBackend {
//!     fn open(&self, args: &ShardSearchArgs) -> Result<Box<dyn ShardSearcher>, FederexError> {
//!         Err(FederexError::shard_search_failure(args.shard.get(), "no backend"))
//!     }
//! }
//!
//! let registry = CoordinatorRegistry::new(
//!     CoordinatorConfig::new(),
//!     Arc::new(StaticIndexCatalog::new()),
//!     Arc::new(LocalShardProvisioner::new("./shards")),
//!     Arc::new(NoBackend),
//! );
//! let context = FederexContext::new(Arc::new(registry));
//! assert_eq!(context.tracker().total_requests(), 0);
//! ```

use crate::registry::CoordinatorRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Per-operation request counts and latencies
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    requests: HashMap<&'static str, u64>,
    failures: HashMap<&'static str, u64>,
    cumulative: HashMap<&'static str, Duration>,
}

impl RequestTracker {
    /// Record one finished request
    pub fn record(&mut self, operation: &'static str, duration: Duration, succeeded: bool) {
        *self.requests.entry(operation).or_default() += 1;
        *self.cumulative.entry(operation).or_insert(Duration::ZERO) += duration;
        if !succeeded {
            *self.failures.entry(operation).or_default() += 1;
        }
    }

    /// Requests of one operation
    pub fn requests(&self, operation: &str) -> u64 {
        self.requests.get(operation).copied().unwrap_or(0)
    }

    /// Failed requests of one operation
    pub fn failures(&self, operation: &str) -> u64 {
        self.failures.get(operation).copied().unwrap_or(0)
    }

    /// Requests across all operations
    pub fn total_requests(&self) -> u64 {
        self.requests.values().sum()
    }

    /// Mean latency of one operation
    pub fn average_latency(&self, operation: &str) -> Option<Duration> {
        let count = self.requests(operation);
        if count == 0 {
            return None;
        }
        self.cumulative
            .get(operation)
            .map(|total| total.div_f64(count as f64))
    }
}

/// Central context for Federex API operations
#[derive(Debug, Clone)]
pub struct FederexContext {
    registry: Arc<CoordinatorRegistry>,
    tracker: RequestTracker,
}

impl FederexContext {
    /// Create a context over a shared registry
    pub fn new(registry: Arc<CoordinatorRegistry>) -> Self {
        Self {
            registry,
            tracker: RequestTracker::default(),
        }
    }

    /// Shared coordinator registry
    pub fn registry(&self) -> &Arc<CoordinatorRegistry> {
        &self.registry
    }

    /// Request statistics of this context
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub(crate) fn record(&mut self, operation: &'static str, duration: Duration, succeeded: bool) {
        self.tracker.record(operation, duration, succeeded);
    }
}
