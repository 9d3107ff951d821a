//! Output error types

use thiserror::Error;

/// Result type for output operations
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors surfaced by output lifecycle operations
///
/// Steady-state delivery failures never appear here - they are resolved
/// by the retry loop or the resume path. Only startup/resume problems
/// surface to the caller.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output's worker task is gone
    #[error("output worker is no longer running")]
    Closed,

    /// The log store failed while reloading pending entries
    #[error(transparent)]
    Store(#[from] courier_store::StoreError),
}
