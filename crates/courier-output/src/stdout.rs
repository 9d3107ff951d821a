//! Stdout sink - human-readable debug output
//!
//! Writes one line per entry to stdout. Not intended for production use;
//! it exists for quick iteration while wiring up routes.
//!
//! # Example Output
//!
//! ```text
//! 07:34:59.161 pv.top {"page":"home"}
//! 07:35:00.100 activity.tap {"button":"search"}
//! ```

use async_trait::async_trait;
use courier_protocol::Chunk;

use crate::sink::{Sink, WriteOutcome};

/// A sink that prints each entry as a single line
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// Create a new stdout sink
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn kind(&self) -> &'static str {
        "stdout"
    }

    async fn write(&self, chunk: &Chunk) -> WriteOutcome {
        for entry in chunk.entries() {
            let payload = entry
                .payload()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default();
            println!(
                "{} {} {}",
                entry.timestamp().format("%H:%M:%S%.3f"),
                entry.tag(),
                payload
            );
        }
        WriteOutcome::Success
    }
}
