//! Null sink - discards all chunks
//!
//! Every write succeeds immediately. Useful for validating routing and
//! buffering behavior without any delivery overhead; the output's own
//! metrics still count what passed through.

use async_trait::async_trait;
use courier_protocol::Chunk;

use crate::sink::{Sink, WriteOutcome};

/// A sink that accepts and discards every chunk
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NullSink {
    /// Create a new null sink
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for NullSink {
    fn kind(&self) -> &'static str {
        "null"
    }

    async fn write(&self, _chunk: &Chunk) -> WriteOutcome {
        WriteOutcome::Success
    }
}
