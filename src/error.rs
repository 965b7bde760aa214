//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Boxed underlying cause of a failed backend call.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for every cache backend.
///
/// A missing key is never an error; operations report absence through their
/// return values instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Required backend setting missing or invalid (raised at construction)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend cannot be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Call rejected before reaching the backend
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Optional capability group not provided by this backend
    #[error("Capability not supported by {backend}: {capability}")]
    Unsupported {
        backend: &'static str,
        capability: &'static str,
    },

    /// A single backend call failed
    #[error("{op} failed for key '{key}': {source}")]
    Operation {
        op: &'static str,
        key: String,
        #[source]
        source: BoxError,
    },
}

impl CacheError {
    /// Wraps a backend failure with the operation name and key it concerned.
    pub fn operation(
        op: &'static str,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        CacheError::Operation {
            op,
            key: key.into(),
            source: source.into(),
        }
    }

    /// Returns true for failures raised by the backend during a call.
    pub fn is_operation(&self) -> bool {
        matches!(self, CacheError::Operation { .. })
    }
}

// == Remote Error ==
/// Error text reported by a remote store (e.g. a REST `{"error": ...}` reply).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteError(pub String);

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
