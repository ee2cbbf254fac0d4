//! Shard provisioning
//!
//! Before a coordinator can search, every shard of its index has to exist on
//! local storage. Provisioning happens once per coordinator lifetime and runs
//! three steps per shard: initialize, fetch, decompress. Any failure at any
//! shard is fatal to the whole coordinator construction.

use crate::error::FederexError;
use crate::identifiers::{IndexName, ShardOrdinal};
use crate::structures::ShardDescriptor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Acquires the searchable data of one shard
///
/// Implementations are given the prebuilt shard name (`<index>-shardNN`).
#[async_trait]
pub trait ShardProvisioner: Send + Sync {
    /// Prepare any state needed to acquire the shard
    async fn initialize(&self, shard_name: &str) -> Result<(), FederexError>;

    /// Download or otherwise obtain the shard's archive
    async fn fetch(&self, shard_name: &str) -> Result<(), FederexError>;

    /// Expand the fetched archive and return the local index directory
    async fn decompress(&self, shard_name: &str) -> Result<PathBuf, FederexError>;
}

/// Provision every shard of `index` in ordinal order
///
/// The first failure aborts provisioning and is reported as a
/// `ProvisioningFailure` naming the shard ordinal and the underlying cause.
pub async fn provision_shards(
    provisioner: &dyn ShardProvisioner,
    index: &IndexName,
    shard_count: usize,
) -> Result<Vec<ShardDescriptor>, FederexError> {
    let start = Instant::now();
    let mut shards = Vec::with_capacity(shard_count);

    for ordinal in ShardOrdinal::all(shard_count) {
        let name = ordinal.shard_name(index);
        let local_path = provision_one(provisioner, &name)
            .await
            .map_err(|e| FederexError::provisioning_failure(index.as_str(), ordinal.get(), e.to_string()))?;

        debug!(index = %index, shard = ordinal.get(), path = %local_path.display(), "Shard provisioned");
        shards.push(ShardDescriptor {
            ordinal,
            name,
            local_path,
        });
    }

    info!(
        index = %index,
        shard_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "All shards provisioned"
    );
    Ok(shards)
}

async fn provision_one(provisioner: &dyn ShardProvisioner, shard_name: &str) -> Result<PathBuf, FederexError> {
    provisioner.initialize(shard_name).await?;
    provisioner.fetch(shard_name).await?;
    provisioner.decompress(shard_name).await
}

/// Provisioner for shards already expanded under a local root directory
///
/// Shard `<index>-shardNN` is expected at `<root>/<index>-shardNN/`.
#[derive(Debug, Clone)]
pub struct LocalShardProvisioner {
    root: PathBuf,
}

impl LocalShardProvisioner {
    /// Create a provisioner rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory holding the shard directories
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn shard_dir(&self, shard_name: &str) -> PathBuf {
        self.root.join(shard_name)
    }
}

#[async_trait]
impl ShardProvisioner for LocalShardProvisioner {
    async fn initialize(&self, _shard_name: &str) -> Result<(), FederexError> {
        let metadata = tokio::fs::metadata(&self.root).await.map_err(|e| {
            FederexError::Io(std::io::Error::new(
                e.kind(),
                format!("Shard root {} is not accessible: {}", self.root.display(), e),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(FederexError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Shard root {} is not a directory", self.root.display()),
            )));
        }
        Ok(())
    }

    async fn fetch(&self, shard_name: &str) -> Result<(), FederexError> {
        let dir = self.shard_dir(shard_name);
        match tokio::fs::metadata(&dir).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(FederexError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Shard path {} is not a directory", dir.display()),
            ))),
            Err(e) => Err(FederexError::Io(std::io::Error::new(
                e.kind(),
                format!("Shard {} not found at {}: {}", shard_name, dir.display(), e),
            ))),
        }
    }

    async fn decompress(&self, shard_name: &str) -> Result<PathBuf, FederexError> {
        // Local shards are stored expanded
        Ok(self.shard_dir(shard_name))
    }
}
