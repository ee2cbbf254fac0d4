//! Error types for Federex operations
//!
//! This module defines the error type used throughout Federex. Errors are split
//! along the line a transport cares about: client errors (unknown index, bad
//! arguments) and server errors (provisioning, pool failures). Per-shard search
//! failures are part of the taxonomy but are recovered inside the coordinator
//! and never surface from a search call.

use std::time::Duration;
use thiserror::Error;

/// Main error type for all Federex operations
#[derive(Debug, Error)]
pub enum FederexError {
    /// IO operations failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested index is not known to the catalog
    #[error("Index {index} not found!")]
    NotFound { index: String },

    /// Caller supplied an invalid argument
    #[error("Invalid argument: {field} - {reason}. {suggestion}")]
    InvalidArgument {
        field: String,
        reason: String,
        suggestion: String,
    },

    /// A shard could not be provisioned while constructing a coordinator
    #[error("Failed to initialize shard {shard} of index {index}: {reason}")]
    ProvisioningFailure { index: String, shard: usize, reason: String },

    /// A single shard search failed at query time
    #[error("Search on shard {shard} failed: {reason}")]
    ShardSearchFailure { shard: usize, reason: String },

    /// A single shard search exceeded its deadline
    #[error("Search on shard {shard} timed out after {timeout:?}")]
    ShardTimeout { shard: usize, timeout: Duration },

    /// Concurrent execution infrastructure failed
    #[error("Concurrency error: {operation} - {reason}. {suggestion}")]
    ConcurrencyError {
        operation: String,
        reason: String,
        suggestion: String,
    },

    /// Configuration validation or loading failed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FederexError {
    /// Create a not found error for an index name
    pub fn not_found(index: impl Into<String>) -> Self {
        Self::NotFound { index: index.into() }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a provisioning failure for a shard ordinal
    pub fn provisioning_failure(index: impl Into<String>, shard: usize, reason: impl Into<String>) -> Self {
        Self::ProvisioningFailure {
            index: index.into(),
            shard,
            reason: reason.into(),
        }
    }

    /// Create a shard search failure
    pub fn shard_search_failure(shard: usize, reason: impl Into<String>) -> Self {
        Self::ShardSearchFailure {
            shard,
            reason: reason.into(),
        }
    }

    /// Create a concurrency error
    pub fn concurrency_error(
        operation: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::ConcurrencyError {
            operation: operation.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a detailed config error
    pub fn config_error(field: impl Into<String>, reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Config(format!("{} - {}: {}", field.into(), reason.into(), suggestion.into()))
    }

    /// Check if this error was caused by the request rather than the server
    ///
    /// A transport maps these to a 4xx status. Everything else is a server-side
    /// failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidArgument { .. })
    }

    /// Check if retrying the same call later may succeed
    ///
    /// Provisioning failures are never cached by the registry, so a later
    /// `get_or_create` starts provisioning from scratch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ProvisioningFailure { .. }
                | Self::ShardSearchFailure { .. }
                | Self::ShardTimeout { .. }
                | Self::ConcurrencyError { .. }
                | Self::Io(_)
        )
    }

    /// Shard ordinal this error is attributed to, if any
    pub fn shard(&self) -> Option<usize> {
        match self {
            Self::ProvisioningFailure { shard, .. }
            | Self::ShardSearchFailure { shard, .. }
            | Self::ShardTimeout { shard, .. } => Some(*shard),
            _ => None,
        }
    }

    /// Add operation context to an error, preserving the original error information
    pub fn with_operation_context(self, operation: &str, additional_context: &str) -> Self {
        let context = format!("{}: {}", operation, additional_context);

        match self {
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), format!("{}: {}", context, err))),
            Self::Config(msg) => Self::Config(format!("{}: {}", context, msg)),
            Self::ShardSearchFailure { shard, reason } => Self::ShardSearchFailure {
                shard,
                reason: format!("{}: {}", context, reason),
            },
            Self::ProvisioningFailure { index, shard, reason } => Self::ProvisioningFailure {
                index,
                shard,
                reason: format!("{}: {}", context, reason),
            },
            other => other, // Structured client errors keep their original wording
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = FederexError::not_found("msmarco-v1-passage");
        assert_eq!(err.to_string(), "Index msmarco-v1-passage not found!");
        assert!(err.is_client_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_argument_is_client_error() {
        let err = FederexError::invalid_argument("threads_per_shard", "must be positive", "Use a value >= 1");
        assert!(err.is_client_error());
        assert!(err.to_string().contains("threads_per_shard"));
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_provisioning_failure_identifies_shard() {
        let err = FederexError::provisioning_failure("idx", 7, "download refused");
        assert_eq!(err.shard(), Some(7));
        assert!(!err.is_client_error());
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("shard 7"));
        assert!(err.to_string().contains("download refused"));
    }

    #[test]
    fn test_shard_timeout_display() {
        let err = FederexError::ShardTimeout {
            shard: 3,
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.shard(), Some(3));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FederexError = io.into();
        assert!(matches!(err, FederexError::Io(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_operation_context() {
        let err = FederexError::shard_search_failure(2, "reader closed").with_operation_context("search", "index foo");
        match err {
            FederexError::ShardSearchFailure { shard, reason } => {
                assert_eq!(shard, 2);
                assert!(reason.starts_with("search: index foo"));
                assert!(reason.contains("reader closed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = FederexError::not_found("x").with_operation_context("search", "ignored");
        assert!(matches!(err, FederexError::NotFound { .. }));
    }

    #[test]
    fn test_config_error_format() {
        let err = FederexError::config_error("shard_count", "must be greater than 0", "Set shard_count to 10");
        assert_eq!(
            err.to_string(),
            "Configuration error: shard_count - must be greater than 0: Set shard_count to 10"
        );
    }
}
