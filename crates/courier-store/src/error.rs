//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by log store implementations
///
/// The in-memory store never fails; these variants are sized for the
/// durable implementations that live outside this workspace.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium could not be prepared or reached
    #[error("log store unavailable: {0}")]
    Unavailable(String),

    /// I/O error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create an Unavailable error
    #[inline]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a Serialization error
    #[inline]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
