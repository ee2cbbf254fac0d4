//! Identifier types for Federex
//!
//! Type-safe wrappers for the names that flow between the registry, the
//! coordinator and the provisioner, so a logical index name cannot be mixed up
//! with the name of one of its shards.

use crate::error::FederexError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Name of a logical (unsharded) index
///
/// IndexName is the registry key. It is opaque apart from being non-empty and
/// free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexName(String);

impl IndexName {
    /// Create a validated index name
    pub fn new(name: impl Into<String>) -> Result<Self, FederexError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FederexError::invalid_argument(
                "index",
                "cannot be empty",
                "Provide the name of a known index",
            ));
        }
        if name.trim() != name {
            return Err(FederexError::invalid_argument(
                "index",
                format!("'{}' has leading or trailing whitespace", name),
                "Remove surrounding whitespace from the index name",
            ));
        }
        Ok(Self(name))
    }

    /// Borrow the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the shard at `ordinal` within this index
    pub fn shard_name(&self, ordinal: ShardOrdinal) -> String {
        ordinal.shard_name(self)
    }
}

impl Display for IndexName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IndexName {
    type Err = FederexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IndexName {
    type Error = FederexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IndexName> for String {
    fn from(name: IndexName) -> Self {
        name.0
    }
}

impl AsRef<str> for IndexName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IndexName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Position of a shard within a fixed partition count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ShardOrdinal(usize);

impl ShardOrdinal {
    /// Create an ordinal from its raw position
    pub fn new(ordinal: usize) -> Self {
        Self(ordinal)
    }

    /// Raw position of the shard
    pub fn get(self) -> usize {
        self.0
    }

    /// Iterate over every ordinal of a partition with `count` shards
    pub fn all(count: usize) -> impl Iterator<Item = ShardOrdinal> {
        (0..count).map(ShardOrdinal)
    }

    /// Prebuilt shard index name, e.g. `msmarco-shard03`
    pub fn shard_name(self, index: &IndexName) -> String {
        format!("{}-shard{:02}", index.as_str(), self.0)
    }
}

impl Display for ShardOrdinal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for ShardOrdinal {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_index_name_validation() {
        assert!(IndexName::new("msmarco-v1-passage").is_ok());
        assert!(IndexName::new("").is_err());
        assert!(IndexName::new("   ").is_err());
        assert!(IndexName::new(" padded ").is_err());
    }

    #[test]
    fn test_shard_name_format() {
        let index = IndexName::new("msmarco").unwrap();
        assert_eq!(index.shard_name(ShardOrdinal::new(0)), "msmarco-shard00");
        assert_eq!(index.shard_name(ShardOrdinal::new(9)), "msmarco-shard09");
        assert_eq!(index.shard_name(ShardOrdinal::new(12)), "msmarco-shard12");
    }

    #[test]
    fn test_all_ordinals() {
        let ordinals: Vec<usize> = ShardOrdinal::all(3).map(ShardOrdinal::get).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(ShardOrdinal::all(0).count(), 0);
    }

    #[test]
    fn test_index_name_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(IndexName::new("a").unwrap(), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_index_name_serde() {
        let name = IndexName::new("beir-fiqa").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"beir-fiqa\"");
        let back: IndexName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<IndexName>("\"\"").is_err());
    }
}
