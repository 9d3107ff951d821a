//! Courier - Store
//!
//! The crash-safe staging area for entries that are buffered but not yet
//! confirmed delivered.
//!
//! # Contract
//!
//! A [`LogStore`] is a durable keyed set-of-entries store. Keys are
//! *storage groups* - each output namespaces its pending entries under
//! `"{pattern}_{sink-kind}"` so outputs sharing one store never collide.
//! Within a group the store has set semantics addressed by entry
//! identifier:
//!
//! - `add` is an idempotent union-insert.
//! - `remove` is an idempotent set-subtraction; removing an absent entry
//!   is a no-op.
//! - `retrieve_logs` returns everything currently held for a group.
//! - `flush` discards every group (full reset, mostly for tests).
//!
//! Operations for one group must be observable in invocation order
//! (linearizable add/remove per group); the store supplies its own
//! synchronization.
//!
//! # Implementations
//!
//! [`MemoryLogStore`] is the bundled reference implementation. Durable
//! backends (file, database) live outside this workspace and implement
//! the same trait; [`LogEntry`]'s serde derives exist for them.

mod error;
mod memory;

use std::collections::HashSet;

use async_trait::async_trait;
use courier_protocol::LogEntry;

pub use error::{Result, StoreError};
pub use memory::MemoryLogStore;

/// Durable keyed set-of-entries storage
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Idempotent setup of the backing medium
    ///
    /// Called once during orchestrator construction; a failure here aborts
    /// construction.
    async fn prepare(&self) -> Result<()>;

    /// Retrieve all entries stored under `group`
    ///
    /// Returns an empty set when the group holds nothing.
    async fn retrieve_logs(&self, group: &str) -> Result<HashSet<LogEntry>>;

    /// Union-insert `entries` into `group`
    async fn add(&self, entries: &[LogEntry], group: &str) -> Result<()>;

    /// Subtract `entries` from `group`
    ///
    /// Entries not present are ignored.
    async fn remove(&self, entries: &[LogEntry], group: &str) -> Result<()>;

    /// Discard everything across all groups
    async fn flush(&self) -> Result<()>;
}
