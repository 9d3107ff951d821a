//! Delivery metrics for a buffered output

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking one output's delivery behavior
///
/// All counters are relaxed atomics; read them through [`snapshot`].
///
/// [`snapshot`]: OutputMetrics::snapshot
#[derive(Debug, Default)]
pub struct OutputMetrics {
    /// Entries accepted into the buffer
    entries_emitted: AtomicU64,

    /// Entries dropped at emit time for exceeding the byte limit alone
    entries_dropped_oversized: AtomicU64,

    /// Flush passes run (including passes that found an empty buffer)
    flushes: AtomicU64,

    /// Chunk write attempts handed to the sink (retries included)
    chunk_writes: AtomicU64,

    /// Chunks confirmed delivered
    chunks_delivered: AtomicU64,

    /// Entries confirmed delivered
    entries_delivered: AtomicU64,

    /// Retries scheduled after retryable failures
    retries_scheduled: AtomicU64,

    /// Chunks abandoned (non-retryable or retry limit exceeded)
    chunks_abandoned: AtomicU64,

    /// Chunks deferred until the next resume
    chunks_deferred: AtomicU64,
}

impl OutputMetrics {
    /// Create a zeroed metrics instance
    pub const fn new() -> Self {
        Self {
            entries_emitted: AtomicU64::new(0),
            entries_dropped_oversized: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            chunk_writes: AtomicU64::new(0),
            chunks_delivered: AtomicU64::new(0),
            entries_delivered: AtomicU64::new(0),
            retries_scheduled: AtomicU64::new(0),
            chunks_abandoned: AtomicU64::new(0),
            chunks_deferred: AtomicU64::new(0),
        }
    }

    /// Record an accepted entry
    #[inline]
    pub fn record_emitted(&self) {
        self.entries_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an oversized entry dropped at emit time
    #[inline]
    pub fn record_oversized_drop(&self) {
        self.entries_dropped_oversized.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flush pass
    #[inline]
    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chunk handed to the sink
    #[inline]
    pub fn record_chunk_write(&self) {
        self.chunk_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a confirmed delivery
    #[inline]
    pub fn record_delivered(&self, entry_count: u64) {
        self.chunks_delivered.fetch_add(1, Ordering::Relaxed);
        self.entries_delivered.fetch_add(entry_count, Ordering::Relaxed);
    }

    /// Record a scheduled retry
    #[inline]
    pub fn record_retry(&self) {
        self.retries_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an abandoned chunk
    #[inline]
    pub fn record_abandoned(&self) {
        self.chunks_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chunk deferred until resume
    #[inline]
    pub fn record_deferred(&self) {
        self.chunks_deferred.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> OutputMetricsSnapshot {
        OutputMetricsSnapshot {
            entries_emitted: self.entries_emitted.load(Ordering::Relaxed),
            entries_dropped_oversized: self.entries_dropped_oversized.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            chunk_writes: self.chunk_writes.load(Ordering::Relaxed),
            chunks_delivered: self.chunks_delivered.load(Ordering::Relaxed),
            entries_delivered: self.entries_delivered.load(Ordering::Relaxed),
            retries_scheduled: self.retries_scheduled.load(Ordering::Relaxed),
            chunks_abandoned: self.chunks_abandoned.load(Ordering::Relaxed),
            chunks_deferred: self.chunks_deferred.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of output metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMetricsSnapshot {
    pub entries_emitted: u64,
    pub entries_dropped_oversized: u64,
    pub flushes: u64,
    pub chunk_writes: u64,
    pub chunks_delivered: u64,
    pub entries_delivered: u64,
    pub retries_scheduled: u64,
    pub chunks_abandoned: u64,
    pub chunks_deferred: u64,
}
