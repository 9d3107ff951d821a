//! Log entry - the unit of data flowing through the pipeline
//!
//! A `LogEntry` is created by a filter, staged in an output's buffer and
//! log store, and destroyed once a sink confirms delivery. The payload is
//! an opaque `Bytes` blob - the pipeline never inspects it.

use std::hash::{Hash, Hasher};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single tagged, timestamped unit of log data
///
/// # Identity
///
/// Equality and hashing are defined solely by the identifier. This is what
/// makes set-subtraction in the log store and in-flight exclusion during
/// reload well defined: an entry re-read from storage compares equal to
/// the in-memory copy it was persisted from.
///
/// # Serialization
///
/// Entries are serde-serializable so durable [log store] implementations
/// can persist them in whatever encoding they choose.
///
/// [log store]: https://docs.rs/courier-store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique identifier - the sole source of identity
    identifier: Uuid,

    /// Dot-segmented stream label, e.g. `"pv.top"`
    tag: String,

    /// Creation time, assigned by the filter's clock
    timestamp: DateTime<Utc>,

    /// Opaque payload bytes
    payload: Option<Bytes>,
}

impl LogEntry {
    /// Create an entry with a fresh identifier and no payload
    pub fn new(tag: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            tag: tag.into(),
            timestamp,
            payload: None,
        }
    }

    /// Attach a payload to the entry
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Get the unique identifier
    #[inline]
    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    /// Get the tag
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the creation timestamp
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get the payload, if any
    #[inline]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Payload size in bytes (0 when no payload is attached)
    ///
    /// This is the size used by the byte-capped flush path and the
    /// oversized-entry check at emit time.
    #[inline]
    pub fn payload_size(&self) -> usize {
        self.payload.as_ref().map_or(0, Bytes::len)
    }
}

impl PartialEq for LogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for LogEntry {}

impl Hash for LogEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}
