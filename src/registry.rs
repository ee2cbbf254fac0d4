//! Lazily populated registry of per-index coordinators
//!
//! Each index gets its coordinator on first use. Concurrent first requests for
//! the same index share a single construction: the map entry is claimed
//! atomically with an empty [`OnceCell`] and every caller awaits that cell.
//! If construction fails the cell stays empty, the error goes to the callers
//! that were waiting, and the next request retries from scratch.
//!
//! Coordinators are never evicted. Every index ever searched keeps its shards
//! and pool for the lifetime of the registry.

use crate::catalog::IndexCatalog;
use crate::config::CoordinatorConfig;
use crate::error::FederexError;
use crate::identifiers::IndexName;
use crate::provisioner::ShardProvisioner;
use crate::search_coordinator::SearchCoordinator;
use crate::searcher::ShardSearcherFactory;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

type CoordinatorCell = Arc<OnceCell<Arc<SearchCoordinator>>>;

/// Map from index name to its coordinator
pub struct CoordinatorRegistry {
    coordinators: DashMap<IndexName, CoordinatorCell>,
    config: CoordinatorConfig,
    catalog: Arc<dyn IndexCatalog>,
    provisioner: Arc<dyn ShardProvisioner>,
    searcher_factory: Arc<dyn ShardSearcherFactory>,
}

impl CoordinatorRegistry {
    /// Create an empty registry
    ///
    /// Every coordinator it builds uses `config` and the given collaborators.
    pub fn new(
        config: CoordinatorConfig,
        catalog: Arc<dyn IndexCatalog>,
        provisioner: Arc<dyn ShardProvisioner>,
        searcher_factory: Arc<dyn ShardSearcherFactory>,
    ) -> Self {
        Self {
            coordinators: DashMap::new(),
            config,
            catalog,
            provisioner,
            searcher_factory,
        }
    }

    /// Return the coordinator of `index`, building it on first use
    ///
    /// Unknown indexes fail with `NotFound` without touching the map.
    pub async fn get_or_create(&self, index: &IndexName) -> Result<Arc<SearchCoordinator>, FederexError> {
        self.catalog.ensure_known(index)?;

        // Clone the cell out so the shard lock is not held across the await
        let cell = Arc::clone(
            self.coordinators
                .entry(index.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        let coordinator = cell
            .get_or_try_init(|| async {
                debug!(index = %index, "Creating search coordinator");
                let coordinator = SearchCoordinator::new(
                    index.clone(),
                    self.config.clone(),
                    self.provisioner.as_ref(),
                    Arc::clone(&self.searcher_factory),
                    Arc::clone(&self.catalog),
                )
                .await
                .map_err(|e| {
                    warn!(index = %index, error = %e, "Search coordinator creation failed");
                    e
                })?;
                info!(index = %index, "Registered search coordinator");
                Ok::<_, FederexError>(Arc::new(coordinator))
            })
            .await?;

        Ok(Arc::clone(coordinator))
    }

    /// Return the coordinator of `index` if it is already built
    pub fn get(&self, index: &IndexName) -> Option<Arc<SearchCoordinator>> {
        self.coordinators
            .get(index)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of built coordinators
    pub fn len(&self) -> usize {
        self.coordinators
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// True when no coordinator has been built yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of indexes with a built coordinator, sorted
    pub fn index_names(&self) -> Vec<IndexName> {
        let mut names: Vec<IndexName> = self
            .coordinators
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Index catalog the registry validates names against
    pub fn catalog(&self) -> &Arc<dyn IndexCatalog> {
        &self.catalog
    }
}

impl std::fmt::Debug for CoordinatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorRegistry")
            .field("coordinators", &self.index_names())
            .field("config", &self.config)
            .finish()
    }
}
