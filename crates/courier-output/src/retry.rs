//! Retry backoff
//!
//! The delay applied before re-attempting a chunk whose write failed
//! retryably. Pluggable per output via
//! [`BufferedOutputBuilder::backoff`](crate::BufferedOutputBuilder::backoff).

use std::sync::Arc;
use std::time::Duration;

/// Backoff strategy: maps an attempt number (1-based) to a delay
pub type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// Default exponential backoff: `2 × 2^(n−1)` seconds for attempt `n`
///
/// 2s, 4s, 8s, 16s, ... The exponent is clamped so pathological attempt
/// counts cannot overflow.
pub fn default_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(30);
    Duration::from_secs(2u64 << exponent)
}
