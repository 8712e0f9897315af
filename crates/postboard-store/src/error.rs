//! Error types for the post store.
//!
//! All store operations report failures through [`StoreError`]. The HTTP
//! layer maps each variant onto a status code; nothing here knows about
//! HTTP.

use std::path::PathBuf;

use postboard_types::PostId;

/// Errors that can occur in the store and its persistence adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Caller input violates a precondition. The message names the
    /// violated constraint.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No post has the given id.
    #[error("post {0} not found")]
    NotFound(PostId),

    /// The durable store could not be written.
    #[error("persistence error at {}: {source}", path.display())]
    Persistence {
        /// File that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The collection could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every id up to `u64::MAX` is taken.
    #[error("post id space exhausted")]
    IdSpaceExhausted,
}

impl StoreError {
    /// Shorthand for a [`StoreError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a [`StoreError::Persistence`] at `path`.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the store.
pub type StoreResult<T> = Result<T, StoreError>;
