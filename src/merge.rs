//! Top-k merge of per-shard results
//!
//! Shards are searched independently and each returns its own top-`hits`
//! list. The merger concatenates those lists in shard order, sorts them by
//! descending score and truncates to `hits`.
//!
//! # Ordering
//!
//! The sort is stable, so equal scores keep the shard ordinal order first and
//! the position inside the shard's list second. NaN scores rank below every
//! other score.
//!
//! # Approximation
//!
//! Because each shard truncates to `hits` before the merge, the result is the
//! exact global top-`hits` only when no shard holds more than `hits` of the
//! true global top-`hits`. In general it is an approximation, which is accepted
//! for interactive relevance search. Requesting deeper per-shard lists would
//! change observable behavior and is not done here.

use crate::deduplication::{DeduplicationPolicy, ResultDeduplicator};
use crate::structures::ScoredCandidate;
use std::cmp::Ordering;

/// Combines per-shard ranked lists into one ranked, size-capped list
#[derive(Debug, Clone, Copy)]
pub struct ResultMerger {
    hits: usize,
    policy: DeduplicationPolicy,
}

impl ResultMerger {
    /// Create a merger that keeps at most `hits` candidates
    pub fn new(hits: usize) -> Self {
        Self {
            hits,
            policy: DeduplicationPolicy::None,
        }
    }

    /// Apply a deduplication policy before truncation
    pub fn with_deduplication(mut self, policy: DeduplicationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Requested result count
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Merge shard lists, given in shard ordinal order
    pub fn merge<I>(&self, shard_results: I) -> Vec<ScoredCandidate>
    where
        I: IntoIterator<Item = Vec<ScoredCandidate>>,
    {
        let mut merged: Vec<ScoredCandidate> = shard_results.into_iter().flatten().collect();
        merged.sort_by(|a, b| rank_order(a.score, b.score));

        if self.policy != DeduplicationPolicy::None {
            merged = ResultDeduplicator::new(self.policy).deduplicate(merged);
        }

        merged.truncate(self.hits);
        merged
    }
}

/// Merge shard lists into the global top-`hits` without deduplication
pub fn merge_top_k<I>(shard_results: I, hits: usize) -> Vec<ScoredCandidate>
where
    I: IntoIterator<Item = Vec<ScoredCandidate>>,
{
    ResultMerger::new(hits).merge(shard_results)
}

/// Descending score order with NaN last
fn rank_order(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
