//! Courier - Protocol
//!
//! Core data types that flow through the courier pipeline.
//!
//! # Overview
//!
//! - [`LogEntry`] is the unit of data: an identified, tagged, timestamped
//!   payload produced by a filter and consumed by an output.
//! - [`Chunk`] is an immutable batch of entries handed to a sink for
//!   delivery, carrying its own retry count.
//! - [`Clock`] abstracts wall-clock time so timestamping and flush timing
//!   are controllable in tests.
//!
//! # Identity
//!
//! Entries are identified solely by their UUID; two entries with identical
//! tag, timestamp, and payload but different identifiers are distinct.
//! Chunks are identified by their entry set, not their retry count, so a
//! chunk keeps its identity across retry attempts.

mod chunk;
mod clock;
mod entry;

pub use chunk::Chunk;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::LogEntry;

#[cfg(test)]
#[path = "chunk_test.rs"]
mod chunk_test;
