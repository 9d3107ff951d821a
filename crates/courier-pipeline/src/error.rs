//! Pipeline error types
//!
//! Everything here surfaces synchronously at construction or route
//! registration. Steady-state delivery failures never reach these types;
//! they are resolved inside the outputs.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors fatal to orchestrator construction
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A route was registered with an invalid tag pattern
    #[error(transparent)]
    Pattern(#[from] courier_routing::PatternError),

    /// The log store could not be prepared
    #[error("log store setup failed: {0}")]
    Store(#[from] courier_store::StoreError),

    /// A filter factory failed
    #[error("filter setup failed: {0}")]
    FilterSetup(String),

    /// An output factory failed
    #[error("output setup failed: {0}")]
    OutputSetup(String),

    /// An output failed to start
    #[error("output startup failed: {0}")]
    OutputStart(#[from] courier_output::OutputError),
}

impl PipelineError {
    /// Create a FilterSetup error
    #[inline]
    pub fn filter_setup(msg: impl Into<String>) -> Self {
        Self::FilterSetup(msg.into())
    }

    /// Create an OutputSetup error
    #[inline]
    pub fn output_setup(msg: impl Into<String>) -> Self {
        Self::OutputSetup(msg.into())
    }
}

/// Errors produced by a filter's payload conversion
///
/// Conversion failures are logged and the event contributes no entries;
/// they never propagate to the `post_log` caller.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The payload could not be converted into entries
    #[error("payload conversion failed: {0}")]
    Conversion(String),

    /// Payload serialization failed
    #[error("payload serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    /// Create a Conversion error
    #[inline]
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }
}
