//! Known-index catalog
//!
//! The catalog decides which logical index names exist and carries their
//! default search options. The coordinator and the request layer consume it
//! through the [`IndexCatalog`] trait; [`StaticIndexCatalog`] is an in-memory
//! implementation that can also be loaded from a JSON file.

use crate::constants::DEFAULT_EF_SEARCH;
use crate::error::FederexError;
use crate::identifiers::IndexName;
use crate::structures::{strip_class_suffix, SearchOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default search options for one index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexDefaults {
    /// Default HNSW search breadth
    pub ef_search: Option<usize>,
    /// Default query encoder class name
    pub encoder: Option<String>,
    /// Default query generator class name
    pub query_generator: Option<String>,
}

impl IndexDefaults {
    /// Create empty defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default search breadth
    pub fn ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = Some(ef_search);
        self
    }

    /// Set the default encoder
    pub fn encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = Some(encoder.into());
        self
    }

    /// Set the default query generator
    pub fn query_generator(mut self, query_generator: impl Into<String>) -> Self {
        self.query_generator = Some(query_generator.into());
        self
    }

    /// Layer per-request overrides over these defaults
    ///
    /// Class-name valued options lose their `.class` suffix whichever side they
    /// come from. Search breadth falls back to [`DEFAULT_EF_SEARCH`].
    pub fn resolve(&self, overrides: &SearchOptions) -> ResolvedOptions {
        ResolvedOptions {
            ef_search: overrides.ef_search.or(self.ef_search).unwrap_or(DEFAULT_EF_SEARCH),
            encoder: overrides
                .encoder
                .as_deref()
                .or(self.encoder.as_deref())
                .map(strip_class_suffix),
            query_generator: overrides
                .query_generator
                .as_deref()
                .or(self.query_generator.as_deref())
                .map(strip_class_suffix),
        }
    }
}

/// Search options after layering request overrides over catalog defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub ef_search: usize,
    pub encoder: Option<String>,
    pub query_generator: Option<String>,
}

/// Source of known index names and their defaults
pub trait IndexCatalog: Send + Sync {
    /// Whether the index is known
    fn contains(&self, index: &IndexName) -> bool;

    /// Default options of a known index, `None` if unknown
    fn defaults(&self, index: &IndexName) -> Option<IndexDefaults>;

    /// Fail with `NotFound` if the index is unknown
    fn ensure_known(&self, index: &IndexName) -> Result<(), FederexError> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(FederexError::not_found(index.as_str()))
        }
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticIndexCatalog {
    indexes: HashMap<IndexName, IndexDefaults>,
}

impl StaticIndexCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index with its defaults
    pub fn with_index(mut self, index: IndexName, defaults: IndexDefaults) -> Self {
        self.insert(index, defaults);
        self
    }

    /// Register or replace an index
    pub fn insert(&mut self, index: IndexName, defaults: IndexDefaults) {
        self.indexes.insert(index, defaults);
    }

    /// Number of known indexes
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// True when no index is registered
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Load a catalog from a JSON object keyed by index name
    ///
    /// ```json
    /// { "msmarco-v1-passage.bge-base-en-v1.5.hnsw": { "encoder": "BgeBaseEn15.class" } }
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FederexError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FederexError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read index catalog {}: {}", path.display(), e),
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| FederexError::Config(format!("Failed to parse index catalog {}: {}", path.display(), e)))
    }
}

impl IndexCatalog for StaticIndexCatalog {
    fn contains(&self, index: &IndexName) -> bool {
        self.indexes.contains_key(index)
    }

    fn defaults(&self, index: &IndexName) -> Option<IndexDefaults> {
        self.indexes.get(index).cloned()
    }
}
