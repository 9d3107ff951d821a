//! Buffered output - the delivery state machine
//!
//! A [`BufferedOutput`] is a handle to an owned worker task. The worker
//! exclusively owns the entry buffer, the in-flight chunk set, and the
//! last-flush timestamp; every mutation arrives as a command over the
//! handle's channel, so mutations are totally ordered per output.
//!
//! # Command flow
//!
//! - `emit` stages the entry (memory + log store), evaluates the count
//!   and byte triggers, and acknowledges the producer.
//! - The 1-second ticker re-evaluates the time trigger while the timer is
//!   armed.
//! - Sink writes and retry delays run as spawned tasks; their results
//!   re-enter the worker as commands before touching any state.
//! - `suspend` disarms the ticker and acknowledges once it is disarmed;
//!   writes already dispatched keep running.
//!
//! # Crash safety
//!
//! Entries reach the log store before `emit` acknowledges, and leave it
//! only on confirmed delivery or permanent rejection. `start`/`resume`
//! reload the store, skipping entries that belong to a chunk still in
//! flight so a mid-retry chunk is never duplicated into a fresh flush.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use courier_protocol::{Chunk, Clock, LogEntry};
use courier_routing::TagPattern;
use courier_store::{LogStore, StoreError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::BufferedOutputConfig;
use crate::error::{OutputError, Result};
use crate::metrics::OutputMetrics;
use crate::retry::{default_backoff, BackoffFn};
use crate::sink::{Sink, WriteOutcome};
use crate::{Output, TICK_INTERVAL};

/// Commands processed by the worker, in arrival order
enum Command {
    Emit {
        entry: LogEntry,
        ack: oneshot::Sender<()>,
    },
    Flush {
        ack: oneshot::Sender<()>,
    },
    /// start/resume: reload the store, run one flush pass, arm the timer
    Activate {
        ack: oneshot::Sender<std::result::Result<(), StoreError>>,
    },
    Suspend {
        ack: oneshot::Sender<()>,
    },
    /// A retry delay elapsed; hand the chunk to the sink again
    Dispatch { chunk: Chunk },
    /// A sink write completed
    WriteDone {
        chunk: Chunk,
        outcome: WriteOutcome,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}

/// Builder for a [`BufferedOutput`]
pub struct BufferedOutputBuilder {
    tag_pattern: TagPattern,
    sink: Arc<dyn Sink>,
    config: BufferedOutputConfig,
    backoff: BackoffFn,
}

impl BufferedOutputBuilder {
    /// Set the configuration snapshot
    #[must_use]
    pub fn config(mut self, config: BufferedOutputConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the retry backoff strategy
    #[must_use]
    pub fn backoff<F>(mut self, backoff: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Spawn the worker task and return the handle
    ///
    /// The worker starts idle: nothing is reloaded and the timer is not
    /// armed until [`Output::start`] or [`Output::resume`].
    pub fn spawn(self, store: Arc<dyn LogStore>, clock: Arc<dyn Clock>) -> BufferedOutput {
        let storage_group = format!("{}_{}", self.tag_pattern.as_str(), self.sink.kind());
        let metrics = Arc::new(OutputMetrics::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = Worker {
            config: self.config,
            storage_group: storage_group.clone(),
            store,
            sink: self.sink,
            clock,
            backoff: self.backoff,
            buffer: HashSet::new(),
            in_flight: HashSet::new(),
            last_flush: None,
            timer_armed: false,
            commands: rx,
            self_tx: tx.clone(),
            metrics: Arc::clone(&metrics),
        };
        let task = tokio::spawn(worker.run());

        BufferedOutput {
            tag_pattern: self.tag_pattern,
            storage_group,
            commands: tx,
            metrics,
            task,
        }
    }
}

/// Handle to a buffered output worker
///
/// Cheap to share behind an `Arc`; dropping the handle aborts the worker.
pub struct BufferedOutput {
    tag_pattern: TagPattern,
    storage_group: String,
    commands: mpsc::UnboundedSender<Command>,
    metrics: Arc<OutputMetrics>,
    task: JoinHandle<()>,
}

impl BufferedOutput {
    /// Start building a buffered output for the given route and sink
    pub fn builder(tag_pattern: TagPattern, sink: Arc<dyn Sink>) -> BufferedOutputBuilder {
        BufferedOutputBuilder {
            tag_pattern,
            sink,
            config: BufferedOutputConfig::default(),
            backoff: Arc::new(default_backoff),
        }
    }

    /// Spawn a buffered output with the default configuration
    pub fn spawn(
        tag_pattern: TagPattern,
        sink: Arc<dyn Sink>,
        store: Arc<dyn LogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::builder(tag_pattern, sink).spawn(store, clock)
    }

    /// The storage group namespacing this output's pending entries
    #[inline]
    pub fn storage_group(&self) -> &str {
        &self.storage_group
    }

    /// Get this output's delivery metrics
    #[inline]
    pub fn metrics(&self) -> &OutputMetrics {
        &self.metrics
    }

    async fn activate(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.commands
            .send(Command::Activate { ack })
            .map_err(|_| OutputError::Closed)?;
        match done.await {
            Ok(result) => result.map_err(OutputError::Store),
            Err(_) => Err(OutputError::Closed),
        }
    }
}

#[async_trait::async_trait]
impl Output for BufferedOutput {
    fn tag_pattern(&self) -> &TagPattern {
        &self.tag_pattern
    }

    async fn emit(&self, entry: LogEntry) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Emit { entry, ack }).is_err() {
            tracing::warn!(group = %self.storage_group, "emit after worker stopped, dropping entry");
            return;
        }
        // Returns only after the worker has staged the entry and
        // evaluated the flush triggers
        let _ = done.await;
    }

    /// Returns once the drain pass has run on the worker; delivery of the
    /// resulting chunk (if any) completes asynchronously.
    async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Flush { ack }).is_ok() {
            let _ = done.await;
        }
    }

    async fn start(&self) -> Result<()> {
        self.activate().await
    }

    async fn resume(&self) -> Result<()> {
        self.activate().await
    }

    async fn suspend(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Suspend { ack }).is_ok() {
            // Synchronous join: the timer is disarmed once this resolves
            let _ = done.await;
        }
    }

    async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Shutdown { ack }).is_ok() {
            let _ = done.await;
        }
    }
}

impl Drop for BufferedOutput {
    fn drop(&mut self) {
        // Structural cancellation; a clean shutdown() will already have
        // stopped the loop
        self.task.abort();
    }
}

/// The worker task: exclusive owner of all mutable output state
struct Worker {
    config: BufferedOutputConfig,
    storage_group: String,
    store: Arc<dyn LogStore>,
    sink: Arc<dyn Sink>,
    clock: Arc<dyn Clock>,
    backoff: BackoffFn,

    /// Entries staged but not yet part of a chunk
    buffer: HashSet<LogEntry>,

    /// Chunks handed to the sink and not yet resolved
    in_flight: HashSet<Chunk>,

    /// When the last flush pass ran (set even for empty passes)
    last_flush: Option<DateTime<Utc>>,

    /// Whether the periodic time trigger is armed
    timer_armed: bool,

    commands: mpsc::UnboundedReceiver<Command>,

    /// Sender cloned into write and retry tasks so outcomes re-enter the
    /// serial context
    self_tx: mpsc::UnboundedSender<Command>,

    metrics: Arc<OutputMetrics>,
}

impl Worker {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => {
                        if self.handle(command).await {
                            break;
                        }
                    }
                    // All handles dropped
                    None => break,
                },
                _ = ticker.tick(), if self.timer_armed => self.tick().await,
            }
        }

        tracing::debug!(group = %self.storage_group, "output worker stopped");
    }

    /// Process one command; returns true on shutdown
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Emit { entry, ack } => {
                self.emit(entry).await;
                let _ = ack.send(());
            }
            Command::Flush { ack } => {
                self.flush().await;
                let _ = ack.send(());
            }
            Command::Activate { ack } => {
                let result = self.activate().await;
                let _ = ack.send(result);
            }
            Command::Suspend { ack } => {
                self.timer_armed = false;
                let _ = ack.send(());
            }
            Command::Dispatch { chunk } => self.dispatch(chunk),
            Command::WriteDone { chunk, outcome } => self.write_done(chunk, outcome).await,
            Command::Shutdown { ack } => {
                self.timer_armed = false;
                let _ = ack.send(());
                return true;
            }
        }
        false
    }

    async fn emit(&mut self, entry: LogEntry) {
        if let Some(limit) = self.config.chunk_byte_size_limit {
            if entry.payload_size() > limit {
                // Larger than a whole chunk may carry; it could never be sent
                self.metrics.record_oversized_drop();
                tracing::debug!(
                    group = %self.storage_group,
                    size = entry.payload_size(),
                    limit,
                    "dropping entry larger than the chunk byte limit"
                );
                return;
            }
        }

        self.buffer.insert(entry.clone());
        if let Err(error) = self
            .store
            .add(std::slice::from_ref(&entry), &self.storage_group)
            .await
        {
            // Keep the in-memory copy; durability is best-effort while
            // the store itself is failing
            tracing::warn!(
                group = %self.storage_group,
                %error,
                "failed to stage entry in log store"
            );
        }
        self.metrics.record_emitted();

        if self.buffer.len() >= self.config.entry_count_limit {
            self.flush().await;
        } else if let Some(limit) = self.config.chunk_byte_size_limit {
            let buffered: usize = self.buffer.iter().map(LogEntry::payload_size).sum();
            if buffered >= limit {
                self.flush().await;
            }
        }
    }

    /// One buffer-drain pass
    async fn flush(&mut self) {
        self.last_flush = Some(self.clock.now());
        self.metrics.record_flush();

        if self.buffer.is_empty() {
            return;
        }

        // Drain up to the count limit; the buffer is a set, order carries
        // no meaning
        let take = self.buffer.len().min(self.config.entry_count_limit);
        let drained: Vec<LogEntry> = self.buffer.iter().take(take).cloned().collect();
        for entry in &drained {
            self.buffer.remove(entry);
        }

        let selected = match self.config.chunk_byte_size_limit {
            Some(limit) => {
                let mut selected = Vec::with_capacity(drained.len());
                let mut total = 0usize;
                let mut closed = false;
                for entry in drained {
                    if !closed && total + entry.payload_size() < limit {
                        total += entry.payload_size();
                        selected.push(entry);
                    } else {
                        // First overflow closes the chunk; the rest waits
                        // for a later flush
                        closed = true;
                        self.buffer.insert(entry);
                    }
                }
                selected
            }
            None => drained,
        };

        if selected.is_empty() {
            return;
        }

        tracing::trace!(
            group = %self.storage_group,
            entries = selected.len(),
            remaining = self.buffer.len(),
            "flushing chunk"
        );
        self.dispatch(Chunk::new(selected));
    }

    /// Hand a chunk to the sink on a spawned task
    fn dispatch(&mut self, chunk: Chunk) {
        self.in_flight.insert(chunk.clone());
        self.metrics.record_chunk_write();

        let sink = Arc::clone(&self.sink);
        let results = self.self_tx.clone();
        tokio::spawn(async move {
            let outcome = sink.write(&chunk).await;
            // The worker may already be gone on shutdown; there is
            // nothing left to clean up then
            let _ = results.send(Command::WriteDone { chunk, outcome });
        });
    }

    async fn write_done(&mut self, mut chunk: Chunk, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Success => {
                self.in_flight.remove(&chunk);
                self.remove_from_store(&chunk).await;
                self.metrics.record_delivered(chunk.len() as u64);
                tracing::trace!(
                    group = %self.storage_group,
                    entries = chunk.len(),
                    "chunk delivered"
                );
            }
            WriteOutcome::NonRetryable => {
                // Same cleanup as success; the data is gone either way
                self.in_flight.remove(&chunk);
                self.remove_from_store(&chunk).await;
                self.metrics.record_abandoned();
                tracing::warn!(
                    group = %self.storage_group,
                    entries = chunk.len(),
                    "sink rejected chunk permanently, dropping entries"
                );
            }
            WriteOutcome::RetryAfterResume => {
                // Stays durably queued; reloaded by the next resume
                self.in_flight.remove(&chunk);
                self.metrics.record_deferred();
                tracing::debug!(
                    group = %self.storage_group,
                    entries = chunk.len(),
                    "chunk deferred until resume"
                );
            }
            WriteOutcome::Retryable => {
                chunk.increment_retry_count();
                if chunk.retry_count() <= self.config.retry_limit {
                    let delay = (self.backoff)(chunk.retry_count());
                    self.metrics.record_retry();
                    tracing::debug!(
                        group = %self.storage_group,
                        attempt = chunk.retry_count(),
                        delay_ms = delay.as_millis() as u64,
                        "scheduling chunk retry"
                    );
                    let results = self.self_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = results.send(Command::Dispatch { chunk });
                    });
                } else {
                    // Entries stay persisted; they come back on the next
                    // resume
                    self.in_flight.remove(&chunk);
                    self.metrics.record_abandoned();
                    tracing::warn!(
                        group = %self.storage_group,
                        entries = chunk.len(),
                        retries = chunk.retry_count() - 1,
                        "retry limit exceeded, leaving chunk queued for resume"
                    );
                }
            }
        }
    }

    async fn remove_from_store(&self, chunk: &Chunk) {
        if let Err(error) = self.store.remove(chunk.entries(), &self.storage_group).await {
            tracing::warn!(
                group = %self.storage_group,
                %error,
                "failed to remove delivered entries from log store"
            );
        }
    }

    /// start/resume: reload pending entries, flush once, arm the timer
    async fn activate(&mut self) -> std::result::Result<(), StoreError> {
        self.reload().await?;
        self.flush().await;
        self.timer_armed = true;
        Ok(())
    }

    /// Rebuild the buffer from the store, excluding entries that belong
    /// to a chunk still in flight
    async fn reload(&mut self) -> std::result::Result<(), StoreError> {
        let stored = self.store.retrieve_logs(&self.storage_group).await?;
        let in_flight = &self.in_flight;
        let pending: HashSet<LogEntry> = stored
            .into_iter()
            .filter(|entry| !in_flight.iter().any(|chunk| chunk.contains(entry.identifier())))
            .collect();
        self.buffer = pending;

        tracing::debug!(
            group = %self.storage_group,
            reloaded = self.buffer.len(),
            "reloaded pending entries from log store"
        );
        Ok(())
    }

    /// Periodic time-trigger evaluation
    async fn tick(&mut self) {
        match self.last_flush {
            Some(last) => {
                let elapsed = self.clock.now().signed_duration_since(last);
                let due = elapsed
                    .to_std()
                    .map_or(false, |elapsed| elapsed > self.config.flush_interval);
                if due {
                    self.flush().await;
                }
            }
            None => self.flush().await,
        }
    }
}
