//! Common test utilities for integration tests
//!
//! Integration tests cannot see the crate's `test_utils`, so this module
//! provides a file-backed shard layout: every shard is a directory under a
//! temporary root holding a `hits.txt` of `docid score` lines. The searcher
//! ranks those lines by score and ignores the query text.

#![allow(dead_code)]

use federex::catalog::{IndexDefaults, StaticIndexCatalog};
use federex::provisioner::LocalShardProvisioner;
use federex::registry::CoordinatorRegistry;
use federex::searcher::{ShardSearchArgs, ShardSearcher, ShardSearcherFactory};
use federex::{CoordinatorConfig, FederexError, IndexName, ScoredCandidate};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Error messages for consistent test error reporting
pub mod test_error_messages {
    pub const FAILED_TO_CREATE_TEMP_DIR: &str = "Failed to create test temporary directory";
    pub const FAILED_TO_WRITE_SHARD: &str = "Failed to write shard fixture";
}

/// Creates a temporary directory for test use with proper error handling
pub fn create_temp_dir_for_test() -> TempDir {
    TempDir::new().expect(test_error_messages::FAILED_TO_CREATE_TEMP_DIR)
}

/// Write one shard directory with the given hits
pub fn write_shard(root: &Path, index: &str, ordinal: usize, hits: &[(&str, f32)]) {
    let dir = root.join(format!("{}-shard{:02}", index, ordinal));
    std::fs::create_dir_all(&dir).expect(test_error_messages::FAILED_TO_WRITE_SHARD);
    let body: String = hits.iter().map(|(id, score)| format!("{} {}\n", id, score)).collect();
    std::fs::write(dir.join("hits.txt"), body).expect(test_error_messages::FAILED_TO_WRITE_SHARD);
}

/// Write an empty shard directory with no `hits.txt`, so searching it fails
pub fn write_broken_shard(root: &Path, index: &str, ordinal: usize) {
    let dir = root.join(format!("{}-shard{:02}", index, ordinal));
    std::fs::create_dir_all(dir).expect(test_error_messages::FAILED_TO_WRITE_SHARD);
}

/// Searcher factory reading `hits.txt` from the shard directory
#[derive(Default)]
pub struct FileSearcherFactory {
    pub opened: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl ShardSearcherFactory for FileSearcherFactory {
    fn open(&self, args: &ShardSearchArgs) -> Result<Box<dyn ShardSearcher>, FederexError> {
        let body = std::fs::read_to_string(args.index_path.join("hits.txt"))?;
        let hits = body
            .lines()
            .filter_map(|line| {
                let (id, score) = line.split_once(' ')?;
                Some(ScoredCandidate::new(id, score.parse().ok()?))
            })
            .collect();

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FileSearcher {
            hits,
            released: Arc::clone(&self.released),
        }))
    }
}

struct FileSearcher {
    hits: Vec<ScoredCandidate>,
    released: Arc<AtomicUsize>,
}

impl ShardSearcher for FileSearcher {
    fn search(&mut self, _query: &str, hits: usize) -> Result<Vec<ScoredCandidate>, FederexError> {
        let mut ranked = self.hits.clone();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(hits);
        Ok(ranked)
    }
}

impl Drop for FileSearcher {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Temporary shard root plus a registry over it
pub struct Fixture {
    pub root: TempDir,
    pub factory: Arc<FileSearcherFactory>,
    pub registry: Arc<CoordinatorRegistry>,
}

impl Fixture {
    /// Registry knowing `indexes`, each with `shard_count` shards
    ///
    /// Shard directories are written by the caller before first use.
    pub fn new(indexes: &[&str], config: CoordinatorConfig) -> Self {
        let root = create_temp_dir_for_test();
        let factory = Arc::new(FileSearcherFactory::default());

        let mut catalog = StaticIndexCatalog::new();
        for name in indexes {
            catalog.insert(IndexName::new(*name).expect("valid index name"), IndexDefaults::new());
        }

        let registry = CoordinatorRegistry::new(
            config,
            Arc::new(catalog),
            Arc::new(LocalShardProvisioner::new(root.path())),
            Arc::clone(&factory) as Arc<dyn ShardSearcherFactory>,
        );

        Self {
            root,
            factory,
            registry: Arc::new(registry),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

pub fn index(name: &str) -> IndexName {
    IndexName::new(name).expect("valid index name")
}
