//! Filter contract - payload to entries conversion
//!
//! A filter turns a posted payload into zero or more [`LogEntry`] values.
//! Conversion is pure apart from reading the shared clock for
//! timestamping.

use courier_protocol::{Clock, LogEntry};
use courier_routing::TagPattern;
use serde_json::Value;

use crate::error::FilterError;

/// Converts posted payloads into log entries
pub trait Filter: Send + Sync {
    /// The routing pattern this filter subscribes to
    fn tag_pattern(&self) -> &TagPattern;

    /// Convert one posted event into entries
    ///
    /// `captured` is the substring bound by the pattern's wildcard when it
    /// matched the event's tag. Timestamps should come from `clock`.
    fn convert_to_logs(
        &self,
        payload: Option<&Value>,
        tag: &str,
        captured: Option<&str>,
        clock: &dyn Clock,
    ) -> Result<Vec<LogEntry>, FilterError>;
}

/// A filter that serializes the posted JSON payload into one entry
///
/// The most common case: the event becomes a single entry tagged with the
/// full posted tag, carrying the payload as serialized JSON bytes. Events
/// without a payload produce an entry without one.
pub struct JsonFilter {
    tag_pattern: TagPattern,
}

impl JsonFilter {
    /// Create a JSON filter for the given route
    pub fn new(tag_pattern: TagPattern) -> Self {
        Self { tag_pattern }
    }
}

impl Filter for JsonFilter {
    fn tag_pattern(&self) -> &TagPattern {
        &self.tag_pattern
    }

    fn convert_to_logs(
        &self,
        payload: Option<&Value>,
        tag: &str,
        _captured: Option<&str>,
        clock: &dyn Clock,
    ) -> Result<Vec<LogEntry>, FilterError> {
        let entry = LogEntry::new(tag, clock.now());
        let entry = match payload {
            Some(payload) => entry.with_payload(serde_json::to_vec(payload)?),
            None => entry,
        };
        Ok(vec![entry])
    }
}
