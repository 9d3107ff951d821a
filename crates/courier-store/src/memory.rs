//! In-memory log store
//!
//! The reference [`LogStore`] implementation. Entries survive orchestrator
//! restarts as long as the process (and the shared `Arc`) lives, which is
//! exactly what the crash-recovery tests exercise; it provides no
//! durability across processes.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use courier_protocol::LogEntry;
use parking_lot::Mutex;

use crate::error::Result;
use crate::LogStore;

/// In-memory reference implementation of [`LogStore`]
///
/// A mutex-guarded map of storage group to entry set. All operations are
/// linearizable per group (and, with a single lock, across groups too).
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    groups: Mutex<HashMap<String, HashSet<LogEntry>>>,
}

impl MemoryLogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held for `group`
    ///
    /// Test convenience; the trait surface has no counting operation.
    pub fn group_len(&self, group: &str) -> usize {
        self.groups.lock().get(group).map_or(0, HashSet::len)
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    async fn retrieve_logs(&self, group: &str) -> Result<HashSet<LogEntry>> {
        let groups = self.groups.lock();
        Ok(groups.get(group).cloned().unwrap_or_default())
    }

    async fn add(&self, entries: &[LogEntry], group: &str) -> Result<()> {
        let mut groups = self.groups.lock();
        let set = groups.entry(group.to_owned()).or_default();
        set.extend(entries.iter().cloned());
        Ok(())
    }

    async fn remove(&self, entries: &[LogEntry], group: &str) -> Result<()> {
        let mut groups = self.groups.lock();
        if let Some(set) = groups.get_mut(group) {
            for entry in entries {
                set.remove(entry);
            }
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.groups.lock().clear();
        Ok(())
    }
}
