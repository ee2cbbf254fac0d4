//! Duplicate handling for merged search results
//!
//! Under correct partitioning a document lives in exactly one shard, so the
//! default policy leaves merged results untouched and does not look for
//! duplicates. `ByDocumentId` is available for partitions that are known to
//! overlap.
//!
//! ```rust
//! use federex::deduplication::{DeduplicationPolicy, ResultDeduplicator};
//! use federex::structures::ScoredCandidate;
//!
//! let mut deduplicator = ResultDeduplicator::new(DeduplicationPolicy::ByDocumentId);
//! let unique = deduplicator.deduplicate(vec![
//!     ScoredCandidate::new("d1", 0.9),
//!     ScoredCandidate::new("d1", 0.4),
//!     ScoredCandidate::new("d2", 0.5),
//! ]);
//! assert_eq!(unique.len(), 2);
//! ```

use crate::structures::ScoredCandidate;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Deduplication policy for merged results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeduplicationPolicy {
    /// Keep every candidate, duplicates included
    #[default]
    None,

    /// Keep only the first (highest ranked) candidate per document id
    ///
    /// Input must already be sorted by descending score for "first" to mean
    /// "highest scoring".
    ByDocumentId,
}

impl DeduplicationPolicy {
    /// Get a human-readable description of this policy
    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No deduplication",
            Self::ByDocumentId => "Deduplicate by document ID",
        }
    }
}

/// Statistics about deduplication operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeduplicationStats {
    /// Total number of candidates processed
    pub total_processed: usize,
    /// Number of duplicates removed
    pub duplicates_removed: usize,
}

impl DeduplicationStats {
    /// Record results of a deduplication pass
    pub fn record(&mut self, processed: usize, unique: usize) {
        self.total_processed += processed;
        self.duplicates_removed += processed - unique;
    }
}

/// Result deduplicator with a configurable policy
pub struct ResultDeduplicator {
    policy: DeduplicationPolicy,
    seen_documents: FxHashSet<String>,
    stats: DeduplicationStats,
}

impl ResultDeduplicator {
    /// Create a new deduplicator with the specified policy
    pub fn new(policy: DeduplicationPolicy) -> Self {
        Self {
            policy,
            seen_documents: FxHashSet::default(),
            stats: DeduplicationStats::default(),
        }
    }

    /// Get the current deduplication policy
    pub fn policy(&self) -> DeduplicationPolicy {
        self.policy
    }

    /// Get current deduplication statistics
    pub fn stats(&self) -> &DeduplicationStats {
        &self.stats
    }

    /// Deduplicate ranked candidates according to the policy, preserving order
    pub fn deduplicate(&mut self, candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        let original_count = candidates.len();

        let unique = match self.policy {
            DeduplicationPolicy::None => candidates,
            DeduplicationPolicy::ByDocumentId => {
                self.seen_documents.clear();
                let seen = &mut self.seen_documents;
                candidates
                    .into_iter()
                    .filter(|candidate| seen.insert(candidate.docid.clone()))
                    .collect()
            }
        };

        self.stats.record(original_count, unique.len());
        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked() -> Vec<ScoredCandidate> {
        vec![
            ScoredCandidate::new("a", 0.9),
            ScoredCandidate::new("b", 0.8),
            ScoredCandidate::new("a", 0.7),
            ScoredCandidate::new("c", 0.6),
            ScoredCandidate::new("b", 0.1),
        ]
    }

    #[test]
    fn test_none_policy_keeps_duplicates() {
        let mut dedup = ResultDeduplicator::new(DeduplicationPolicy::None);
        let out = dedup.deduplicate(ranked());
        assert_eq!(out, ranked());
        assert_eq!(dedup.stats().duplicates_removed, 0);
    }

    #[test]
    fn test_by_document_id_keeps_first_occurrence() {
        let mut dedup = ResultDeduplicator::new(DeduplicationPolicy::ByDocumentId);
        let out = dedup.deduplicate(ranked());
        let ids: Vec<&str> = out.iter().map(|c| c.docid.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(out[0].score, 0.9);
        assert_eq!(out[1].score, 0.8);
        assert_eq!(dedup.stats().total_processed, 5);
        assert_eq!(dedup.stats().duplicates_removed, 2);
    }

    #[test]
    fn test_deduplicator_is_reusable() {
        let mut dedup = ResultDeduplicator::new(DeduplicationPolicy::ByDocumentId);
        assert_eq!(dedup.deduplicate(ranked()).len(), 3);
        // State from the previous pass must not leak into the next one
        assert_eq!(dedup.deduplicate(ranked()).len(), 3);
        assert_eq!(dedup.stats().duplicates_removed, 4);
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(DeduplicationPolicy::default(), DeduplicationPolicy::None);
        assert_eq!(DeduplicationPolicy::ByDocumentId.description(), "Deduplicate by document ID");
    }
}
