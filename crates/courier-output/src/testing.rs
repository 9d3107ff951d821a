//! Test support - a scriptable recording sink
//!
//! [`RecordingSink`] captures every chunk it is asked to write and
//! replays scripted outcomes, so tests can drive the buffered output
//! through every branch of the delivery state machine. It lives in the
//! library (not behind `cfg(test)`) so downstream crates can reuse it in
//! their own tests; build fixtures per test, never share one.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use courier_protocol::Chunk;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};

use crate::sink::{Sink, WriteOutcome};

/// A sink that records chunks and replays scripted outcomes
pub struct RecordingSink {
    /// Outcomes consumed one per write; empty falls back to the default
    scripted: Mutex<VecDeque<WriteOutcome>>,

    /// Outcome returned once the script runs dry
    default_outcome: WriteOutcome,

    /// Every chunk passed to `write`, in invocation order
    chunks: Mutex<Vec<Chunk>>,

    /// Number of `write` invocations so far
    write_count: AtomicU64,

    /// Wakes `wait_for_writes` callers
    notify: Notify,

    /// When gating is enabled, each write consumes one permit before
    /// completing, letting tests hold chunks in flight
    gate: Option<Semaphore>,
}

impl RecordingSink {
    /// A sink whose every write succeeds
    pub fn new() -> Self {
        Self::with_default_outcome(WriteOutcome::Success)
    }

    /// A sink whose every write returns `outcome` (unless scripted)
    pub fn with_default_outcome(outcome: WriteOutcome) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default_outcome: outcome,
            chunks: Mutex::new(Vec::new()),
            write_count: AtomicU64::new(0),
            notify: Notify::new(),
            gate: None,
        }
    }

    /// A succeeding sink whose writes block until [`release`] grants a
    /// permit, keeping their chunk in flight meanwhile
    ///
    /// [`release`]: RecordingSink::release
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Queue an outcome for an upcoming write, ahead of the default
    pub fn push_outcome(&self, outcome: WriteOutcome) {
        self.scripted.lock().push_back(outcome);
    }

    /// Allow `n` gated writes to complete
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of `write` invocations so far
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every chunk written so far
    pub fn chunks(&self) -> Vec<Chunk> {
        self.chunks.lock().clone()
    }

    /// Wait until at least `n` writes have been invoked
    pub async fn wait_for_writes(&self, n: u64) {
        loop {
            let notified = self.notify.notified();
            if self.write_count() >= n {
                return;
            }
            notified.await;
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    fn kind(&self) -> &'static str {
        "recording"
    }

    async fn write(&self, chunk: &Chunk) -> WriteOutcome {
        self.chunks.lock().push(chunk.clone());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();

        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return WriteOutcome::RetryAfterResume,
            }
        }

        let scripted = self.scripted.lock().pop_front();
        scripted.unwrap_or(self.default_outcome)
    }
}
