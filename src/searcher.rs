//! Per-shard searcher contract
//!
//! The ranking algorithm itself lives outside this crate. A coordinator only
//! needs a factory that opens a searcher over one shard's local data, and the
//! searcher's `search(query, hits)`. Searchers are opened and dropped within a
//! single shard task, so the underlying resource (an opened index reader, a
//! loaded graph) is never shared between concurrently running tasks and is
//! released when the task ends, whether the search succeeded or not.

use crate::catalog::ResolvedOptions;
use crate::error::FederexError;
use crate::identifiers::ShardOrdinal;
use crate::structures::{ScoredCandidate, ShardDescriptor};
use std::path::PathBuf;

/// Immutable arguments for searching one shard
///
/// A fresh value is built for every shard task at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSearchArgs {
    /// Shard the arguments belong to
    pub shard: ShardOrdinal,
    /// Local directory of the shard index
    pub index_path: PathBuf,
    /// HNSW search breadth
    pub ef_search: usize,
    /// Query encoder, `.class` suffix already stripped
    pub encoder: Option<String>,
    /// Query generator, `.class` suffix already stripped
    pub query_generator: Option<String>,
}

impl ShardSearchArgs {
    /// Build the arguments of one shard from the request's resolved options
    pub fn for_shard(shard: &ShardDescriptor, options: &ResolvedOptions) -> Self {
        Self {
            shard: shard.ordinal,
            index_path: shard.local_path.clone(),
            ef_search: options.ef_search,
            encoder: options.encoder.clone(),
            query_generator: options.query_generator.clone(),
        }
    }
}

/// An opened searcher over one shard
///
/// Resources are released on drop.
pub trait ShardSearcher: Send {
    /// Return at most `hits` candidates ranked by descending score
    fn search(&mut self, query: &str, hits: usize) -> Result<Vec<ScoredCandidate>, FederexError>;
}

/// Opens searchers from per-shard arguments
pub trait ShardSearcherFactory: Send + Sync {
    /// Open a searcher for the shard described by `args`
    fn open(&self, args: &ShardSearchArgs) -> Result<Box<dyn ShardSearcher>, FederexError>;
}

/// Open a searcher, run one query and release the searcher
///
/// This is the body of a shard task. The searcher is dropped before the
/// function returns on every path.
pub fn search_shard(
    factory: &dyn ShardSearcherFactory,
    args: &ShardSearchArgs,
    query: &str,
    hits: usize,
) -> Result<Vec<ScoredCandidate>, FederexError> {
    let mut searcher = factory.open(args)?;
    let mut candidates = searcher.search(query, hits)?;
    drop(searcher);

    candidates.truncate(hits);
    Ok(candidates)
}
