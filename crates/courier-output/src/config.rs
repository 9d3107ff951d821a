//! Buffered output configuration

use std::time::Duration;

/// Configuration snapshot for one [`BufferedOutput`] instance
///
/// Read-only once the output is spawned; every trigger evaluation reads
/// the same snapshot.
///
/// [`BufferedOutput`]: crate::BufferedOutput
#[derive(Debug, Clone)]
pub struct BufferedOutputConfig {
    /// Flush when the buffer reaches this many entries; also the maximum
    /// entry count per chunk
    pub entry_count_limit: usize,

    /// Flush when this much time has passed since the last flush
    pub flush_interval: Duration,

    /// Retryable failures tolerated per chunk before it is abandoned
    pub retry_limit: u32,

    /// Cap on a chunk's cumulative payload bytes; entries whose payload
    /// alone exceeds it are dropped at emit time. `None` means unbounded.
    pub chunk_byte_size_limit: Option<usize>,
}

impl Default for BufferedOutputConfig {
    fn default() -> Self {
        Self {
            entry_count_limit: 5,
            flush_interval: Duration::from_secs(10),
            retry_limit: 3,
            chunk_byte_size_limit: None,
        }
    }
}

impl BufferedOutputConfig {
    /// Set the entry count limit
    #[must_use]
    pub fn with_entry_count_limit(mut self, limit: usize) -> Self {
        self.entry_count_limit = limit;
        self
    }

    /// Set the flush interval
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Set the retry limit
    #[must_use]
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Set the chunk byte size limit
    #[must_use]
    pub fn with_chunk_byte_size_limit(mut self, limit: usize) -> Self {
        self.chunk_byte_size_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BufferedOutputConfig::default();
        assert_eq!(config.entry_count_limit, 5);
        assert_eq!(config.flush_interval, Duration::from_secs(10));
        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.chunk_byte_size_limit, None);
    }

    #[test]
    fn test_builders() {
        let config = BufferedOutputConfig::default()
            .with_entry_count_limit(100)
            .with_flush_interval(Duration::from_secs(1))
            .with_retry_limit(5)
            .with_chunk_byte_size_limit(4096);

        assert_eq!(config.entry_count_limit, 100);
        assert_eq!(config.flush_interval, Duration::from_secs(1));
        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.chunk_byte_size_limit, Some(4096));
    }
}
