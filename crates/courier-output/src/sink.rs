//! Sink contract - the pluggable delivery target
//!
//! A sink performs the actual transmission of a chunk (network call, file
//! append, whatever the deployment needs). The output core only sees the
//! four-way outcome.

use async_trait::async_trait;
use courier_protocol::Chunk;

/// Result of one delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The chunk was delivered; its entries can be forgotten
    Success,

    /// Transient failure; the same chunk should be retried after backoff
    Retryable,

    /// Failure that should wait for the next resume (e.g. the device went
    /// offline); the entries stay durably queued, no retry is scheduled
    RetryAfterResume,

    /// Permanent failure; the entries are discarded without delivery
    NonRetryable,
}

/// Pluggable delivery target invoked by [`BufferedOutput`]
///
/// `write` may take as long as it needs - there is no timeout on the
/// core's side. The returned outcome is the one and only report for that
/// attempt. A sink that never completes leaves its chunk perpetually in
/// flight; honoring completion is the sink's contract.
///
/// [`BufferedOutput`]: crate::BufferedOutput
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short type identifier, e.g. `"stdout"`
    ///
    /// Combined with the output's tag pattern to form the storage group
    /// that namespaces pending entries in the log store.
    fn kind(&self) -> &'static str;

    /// Attempt to deliver one chunk
    async fn write(&self, chunk: &Chunk) -> WriteOutcome;
}
