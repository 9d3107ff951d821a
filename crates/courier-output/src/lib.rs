//! Courier - Output
//!
//! The delivery engine: accepts entries, buffers them, decides flush
//! timing, builds chunks, drives a pluggable [`Sink`], and manages retry
//! with crash-safe staging in a log store.
//!
//! # Architecture
//!
//! ```text
//! emit ──→ [BufferedOutput handle] ──mpsc──→ [worker task]
//!                                              │ buffer (set)
//!                                              │ in-flight chunks (set)
//!                                              ├──→ LogStore (staging)
//!                                              └──→ Sink::write(chunk)
//!                                                     │ success / retryable /
//!                                                     │ retry-after-resume /
//!                                                     │ non-retryable
//!                                                     └──callback──→ worker
//! ```
//!
//! # Key Design
//!
//! - **Actor isolation**: each [`BufferedOutput`] owns one worker task;
//!   every buffer, in-flight-set, and flush-clock mutation happens there.
//!   Producers hand an entry over and await an acknowledgment, so `emit`
//!   returns only after the entry is staged.
//! - **Crash safety**: entries are persisted to the log store on emit and
//!   removed only when a sink confirms delivery (or rejects permanently).
//!   On start/resume the store is reloaded, excluding entries that belong
//!   to a chunk still in flight.
//! - **Retry**: failed chunks back off exponentially (`2 × 2^(n−1)`
//!   seconds by default) up to the configured retry limit; past the limit
//!   the entries stay persisted and return on the next resume.

mod buffered;
mod config;
mod error;
mod metrics;
mod null;
mod retry;
mod sink;
mod stdout;
pub mod testing;

use async_trait::async_trait;
use courier_protocol::LogEntry;
use courier_routing::TagPattern;

pub use buffered::{BufferedOutput, BufferedOutputBuilder};
pub use config::BufferedOutputConfig;
pub use error::{OutputError, Result};
pub use metrics::{OutputMetrics, OutputMetricsSnapshot};
pub use null::NullSink;
pub use retry::{default_backoff, BackoffFn};
pub use sink::{Sink, WriteOutcome};
pub use stdout::StdoutSink;

/// Interval at which the flush timer re-evaluates the time trigger
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// A delivery target for routed entries
///
/// [`BufferedOutput`] is the buffered implementation; simple pass-through
/// outputs can implement this directly and leave the lifecycle hooks as
/// the default no-ops.
#[async_trait]
pub trait Output: Send + Sync {
    /// The routing pattern this output subscribes to
    fn tag_pattern(&self) -> &TagPattern;

    /// Accept one routed entry
    ///
    /// Fire-and-forget from the producer's perspective: delivery failures
    /// are handled internally and never surface here.
    async fn emit(&self, entry: LogEntry);

    /// Run one buffer-drain pass now, regardless of triggers
    ///
    /// No-op for unbuffered outputs.
    async fn flush(&self) {}

    /// Called once when the owning pipeline starts
    async fn start(&self) -> Result<()> {
        Ok(())
    }

    /// Re-arm after a suspend, reloading any pending state
    async fn resume(&self) -> Result<()> {
        Ok(())
    }

    /// Stop timer-driven work; in-flight deliveries keep running
    async fn suspend(&self) {}

    /// Release resources; called after a final suspend
    async fn shutdown(&self) {}
}
