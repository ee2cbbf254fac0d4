//! Parameter structures for Federex API operations
//!
//! Each operation has a dedicated parameter struct with a `validate` method.
//! [`SearchParams`] also has a builder since most of its fields are optional.
//!
//! # Example
//!
//! ```rust
//! use federex::api::parameters::SearchParams;
//!
//! let params = SearchParams::builder()
//!     .index("msmarco-v2.1-doc")
//!     .query("how do tides work")
//!     .qid("q-17")
//!     .hits(20)
//!     .ef_search(256)
//!     .build()?;
//!
//! assert_eq!(params.hits, 20);
//! assert_eq!(params.options().ef_search, Some(256));
//! # Ok::<(), federex::error::FederexError>(())
//! ```

use crate::constants::{DEFAULT_HITS, MAX_HITS};
use crate::error::FederexError;
use crate::identifiers::IndexName;
use crate::settings::validate_threads_per_shard;
use crate::structures::SearchOptions;
use serde::{Deserialize, Serialize};

/// Parameters for a federated search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Logical index to search
    pub index: IndexName,
    /// Query text
    pub query: String,
    /// Caller's query id, echoed back in the response
    #[serde(default)]
    pub qid: String,
    /// Number of merged results to return
    #[serde(default = "default_hits")]
    pub hits: usize,
    /// HNSW search breadth override
    #[serde(default)]
    pub ef_search: Option<usize>,
    /// Query encoder override
    #[serde(default)]
    pub encoder: Option<String>,
    /// Query generator override
    #[serde(default)]
    pub query_generator: Option<String>,
    /// Threads-per-shard value to store before searching
    #[serde(default)]
    pub threads_per_shard: Option<i64>,
}

fn default_hits() -> usize {
    DEFAULT_HITS
}

impl SearchParams {
    /// Create a new search parameters builder
    pub fn builder() -> SearchParamsBuilder {
        SearchParamsBuilder::default()
    }

    /// Create search parameters with default hits and no overrides
    pub fn new(index: IndexName, query: impl Into<String>) -> Self {
        Self {
            index,
            query: query.into(),
            qid: String::new(),
            hits: DEFAULT_HITS,
            ef_search: None,
            encoder: None,
            query_generator: None,
            threads_per_shard: None,
        }
    }

    /// Per-request overrides of the index defaults
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            ef_search: self.ef_search,
            encoder: self.encoder.clone(),
            query_generator: self.query_generator.clone(),
        }
    }

    /// Validate the search parameters
    pub fn validate(&self) -> Result<(), FederexError> {
        if self.query.trim().is_empty() {
            return Err(FederexError::invalid_argument(
                "query",
                "cannot be empty",
                "Provide the query text",
            ));
        }

        if self.hits == 0 {
            return Err(FederexError::invalid_argument(
                "hits",
                "must be greater than 0",
                "Request at least one result",
            ));
        }

        if self.hits > MAX_HITS {
            return Err(FederexError::invalid_argument(
                "hits",
                format!("{} exceeds the maximum of {}", self.hits, MAX_HITS),
                "Request fewer results",
            ));
        }

        if self.ef_search == Some(0) {
            return Err(FederexError::invalid_argument(
                "ef_search",
                "must be greater than 0",
                "Omit ef_search to use the index default",
            ));
        }

        if let Some(threads) = self.threads_per_shard {
            validate_threads_per_shard(threads)?;
        }

        Ok(())
    }
}

/// Builder for [`SearchParams`]
#[derive(Debug, Default)]
pub struct SearchParamsBuilder {
    index: Option<String>,
    query: Option<String>,
    qid: Option<String>,
    hits: Option<usize>,
    ef_search: Option<usize>,
    encoder: Option<String>,
    query_generator: Option<String>,
    threads_per_shard: Option<i64>,
}

impl SearchParamsBuilder {
    /// Set the index name
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the query text
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the query id
    pub fn qid(mut self, qid: impl Into<String>) -> Self {
        self.qid = Some(qid.into());
        self
    }

    /// Set the number of results
    pub fn hits(mut self, hits: usize) -> Self {
        self.hits = Some(hits);
        self
    }

    /// Override ef_search
    pub fn ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = Some(ef_search);
        self
    }

    /// Override the encoder
    pub fn encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = Some(encoder.into());
        self
    }

    /// Override the query generator
    pub fn query_generator(mut self, query_generator: impl Into<String>) -> Self {
        self.query_generator = Some(query_generator.into());
        self
    }

    /// Store a new threads-per-shard value before searching
    pub fn threads_per_shard(mut self, threads: i64) -> Self {
        self.threads_per_shard = Some(threads);
        self
    }

    /// Build the SearchParams with validation
    pub fn build(self) -> Result<SearchParams, FederexError> {
        let index = self.index.ok_or_else(|| {
            FederexError::invalid_argument("index", "is required", "Provide the index name using index()")
        })?;
        let query = self.query.ok_or_else(|| {
            FederexError::invalid_argument("query", "is required", "Provide the query text using query()")
        })?;

        let params = SearchParams {
            index: IndexName::new(index)?,
            query,
            qid: self.qid.unwrap_or_default(),
            hits: self.hits.unwrap_or(DEFAULT_HITS),
            ef_search: self.ef_search,
            encoder: self.encoder,
            query_generator: self.query_generator,
            threads_per_shard: self.threads_per_shard,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Parameters for reading an index's settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSettingsParams {
    pub index: IndexName,
}

impl GetSettingsParams {
    pub fn new(index: IndexName) -> Self {
        Self { index }
    }
}

/// Parameters for updating an index's settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsParams {
    pub index: IndexName,
    /// New worker threads per shard; must be positive. `None` changes nothing.
    #[serde(default)]
    pub threads_per_shard: Option<i64>,
}

impl UpdateSettingsParams {
    pub fn new(index: IndexName, threads_per_shard: i64) -> Self {
        Self {
            index,
            threads_per_shard: Some(threads_per_shard),
        }
    }

    /// Update that touches no setting
    pub fn unchanged(index: IndexName) -> Self {
        Self {
            index,
            threads_per_shard: None,
        }
    }

    /// Validate the update
    pub fn validate(&self) -> Result<(), FederexError> {
        match self.threads_per_shard {
            Some(threads) => validate_threads_per_shard(threads).map(|_| ()),
            None => Ok(()),
        }
    }
}
