//! Test utilities for Federex testing
//!
//! This module provides the temporary-directory environment plus scripted
//! implementations of the provisioner and searcher contracts, so coordinator
//! behavior can be exercised without a real ranking backend.

use crate::error::FederexError;
use crate::provisioner::ShardProvisioner;
use crate::searcher::{ShardSearchArgs, ShardSearcher, ShardSearcherFactory};
use crate::structures::ScoredCandidate;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// RAII-based test environment for isolated testing
///
/// The temporary directory is removed when the environment is dropped.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub test_name: String,
}

impl TestEnvironment {
    /// Create a new test environment with the given test name
    ///
    /// # Panics
    /// Panics if unable to create temporary directory
    pub fn new(test_name: &str) -> Self {
        let temp_dir =
            TempDir::new().unwrap_or_else(|e| panic!("Failed to create temp dir for test {}: {}", test_name, e));

        Self {
            temp_dir,
            test_name: test_name.to_string(),
        }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a subdirectory within the test environment
    pub fn create_subdir(&self, name: &str) -> std::io::Result<PathBuf> {
        let subdir_path = self.temp_dir.path().join(name);
        std::fs::create_dir_all(&subdir_path)?;
        Ok(subdir_path)
    }
}

/// Scripted behavior of one shard
#[derive(Debug, Clone)]
pub enum ShardBehavior {
    /// Return these candidates
    Results(Vec<ScoredCandidate>),
    /// Sleep, then return these candidates
    Slow(Duration, Vec<ScoredCandidate>),
    /// Fail the search
    Fail(String),
    /// Fail while opening the searcher
    FailOpen(String),
    /// Panic inside the search
    Panic,
}

impl ShardBehavior {
    /// Shorthand for a successful shard
    pub fn results(hits: &[(&str, f32)]) -> Self {
        Self::Results(hits.iter().map(|(id, score)| ScoredCandidate::new(*id, *score)).collect())
    }
}

/// Searcher factory driven by per-shard [`ShardBehavior`]
///
/// Counts opened and released searchers and records the arguments every
/// shard task was given.
pub struct RecordingSearcherFactory {
    behaviors: Vec<ShardBehavior>,
    pub opened: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    pub seen_args: Mutex<Vec<ShardSearchArgs>>,
}

impl RecordingSearcherFactory {
    /// Create a factory; shard `i` follows `behaviors[i]`
    pub fn new(behaviors: Vec<ShardBehavior>) -> Self {
        Self {
            behaviors,
            opened: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
            seen_args: Mutex::new(Vec::new()),
        }
    }
}

impl ShardSearcherFactory for RecordingSearcherFactory {
    fn open(&self, args: &ShardSearchArgs) -> Result<Box<dyn ShardSearcher>, FederexError> {
        self.seen_args.lock().push(args.clone());

        let behavior = self
            .behaviors
            .get(args.shard.get())
            .cloned()
            .unwrap_or(ShardBehavior::Results(Vec::new()));

        if let ShardBehavior::FailOpen(reason) = behavior {
            return Err(FederexError::shard_search_failure(args.shard.get(), reason));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSearcher {
            shard: args.shard.get(),
            behavior,
            released: Arc::clone(&self.released),
        }))
    }
}

struct ScriptedSearcher {
    shard: usize,
    behavior: ShardBehavior,
    released: Arc<AtomicUsize>,
}

impl ShardSearcher for ScriptedSearcher {
    fn search(&mut self, _query: &str, _hits: usize) -> Result<Vec<ScoredCandidate>, FederexError> {
        match &self.behavior {
            ShardBehavior::Results(hits) => Ok(hits.clone()),
            ShardBehavior::Slow(delay, hits) => {
                std::thread::sleep(*delay);
                Ok(hits.clone())
            }
            ShardBehavior::Fail(reason) | ShardBehavior::FailOpen(reason) => {
                Err(FederexError::shard_search_failure(self.shard, reason.clone()))
            }
            ShardBehavior::Panic => panic!("scripted panic in shard {}", self.shard),
        }
    }
}

impl Drop for ScriptedSearcher {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Provisioner that resolves shard names to fake paths and counts calls
pub struct CountingProvisioner {
    pub root: PathBuf,
    pub delay: Duration,
    /// Shard name whose fetch fails while `failures_left` is positive
    pub failing_shard: Option<String>,
    pub failures_left: AtomicUsize,
    pub initialize_calls: AtomicUsize,
    pub decompress_calls: AtomicUsize,
}

impl CountingProvisioner {
    /// Provisioner that always succeeds
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/shards"),
            delay: Duration::ZERO,
            failing_shard: None,
            failures_left: AtomicUsize::new(0),
            initialize_calls: AtomicUsize::new(0),
            decompress_calls: AtomicUsize::new(0),
        }
    }

    /// Make every provisioning step sleep
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail fetching `shard_name` for the next `times` attempts
    pub fn failing(mut self, shard_name: &str, times: usize) -> Self {
        self.failing_shard = Some(shard_name.to_string());
        self.failures_left = AtomicUsize::new(times);
        self
    }
}

#[async_trait]
impl ShardProvisioner for CountingProvisioner {
    async fn initialize(&self, _shard_name: &str) -> Result<(), FederexError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }

    async fn fetch(&self, shard_name: &str) -> Result<(), FederexError> {
        if self.failing_shard.as_deref() == Some(shard_name) {
            let failed = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if failed {
                return Err(FederexError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("download of {} refused", shard_name),
                )));
            }
        }
        Ok(())
    }

    async fn decompress(&self, shard_name: &str) -> Result<PathBuf, FederexError> {
        self.decompress_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.root.join(shard_name))
    }
}
