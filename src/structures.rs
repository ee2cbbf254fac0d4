//! Core data structures for Federex
//!
//! Plain value types exchanged between the coordinator, the merger and the
//! request layer.

use crate::constants::CLASS_SUFFIX;
use crate::identifiers::ShardOrdinal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One ranked hit returned by a shard searcher
///
/// Higher scores are more relevant. Document identifiers are not required to be
/// unique across shards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// External document identifier
    pub docid: String,
    /// Relevance score (higher means more relevant)
    pub score: f32,
}

impl ScoredCandidate {
    /// Create a new candidate
    pub fn new(docid: impl Into<String>, score: f32) -> Self {
        Self {
            docid: docid.into(),
            score,
        }
    }
}

/// Per-request overrides layered over per-index defaults
///
/// Every field left as `None` falls back to the catalog default for the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// HNSW search breadth
    pub ef_search: Option<usize>,
    /// Query encoder identifier
    pub encoder: Option<String>,
    /// Query generator identifier
    pub query_generator: Option<String>,
}

impl SearchOptions {
    /// Create options with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the search breadth
    pub fn ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = Some(ef_search);
        self
    }

    /// Override the query encoder
    pub fn encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = Some(encoder.into());
        self
    }

    /// Override the query generator
    pub fn query_generator(mut self, query_generator: impl Into<String>) -> Self {
        self.query_generator = Some(query_generator.into());
        self
    }

    /// True when no field is overridden
    pub fn is_empty(&self) -> bool {
        self.ef_search.is_none() && self.encoder.is_none() && self.query_generator.is_none()
    }
}

/// Strip every `.class` occurrence from a class-name valued option
pub fn strip_class_suffix(name: &str) -> String {
    name.replace(CLASS_SUFFIX, "")
}

/// A provisioned shard, resolved to a locally searchable path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardDescriptor {
    /// Position of the shard within the index
    pub ordinal: ShardOrdinal,
    /// Prebuilt shard index name
    pub name: String,
    /// Local directory the searcher opens
    pub local_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_class_suffix() {
        assert_eq!(strip_class_suffix("CosDprDistilEncoder.class"), "CosDprDistilEncoder");
        assert_eq!(strip_class_suffix("CosDprDistilEncoder"), "CosDprDistilEncoder");
        assert_eq!(strip_class_suffix(""), "");
    }

    #[test]
    fn test_search_options_builder() {
        let options = SearchOptions::new().ef_search(500).encoder("BgeBaseEn15");
        assert_eq!(options.ef_search, Some(500));
        assert_eq!(options.encoder.as_deref(), Some("BgeBaseEn15"));
        assert!(options.query_generator.is_none());
        assert!(!options.is_empty());
        assert!(SearchOptions::default().is_empty());
    }

    #[test]
    fn test_candidate_serialization_shape() {
        let candidate = ScoredCandidate::new("d1", 0.5);
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["docid"], "d1");
        assert_eq!(json["score"], 0.5);
    }
}
