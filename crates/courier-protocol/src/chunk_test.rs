//! Tests for Chunk
//!
//! Chunk identity is its entry set; the retry count never participates.

use std::collections::HashSet;

use chrono::Utc;

use crate::{Chunk, LogEntry};

fn make_entries(count: usize) -> Vec<LogEntry> {
    (0..count)
        .map(|_| LogEntry::new("pv", Utc::now()).with_payload(vec![0u8; 10]))
        .collect()
}

#[test]
fn test_equality_by_entry_set() {
    let entries = make_entries(3);

    let a = Chunk::new(entries.clone());
    let mut reversed = entries.clone();
    reversed.reverse();
    let b = Chunk::new(reversed);

    // Same entries, different order - equal
    assert_eq!(a, b);

    // Different entry set - not equal
    let c = Chunk::new(make_entries(3));
    assert_ne!(a, c);
}

#[test]
fn test_retry_count_does_not_change_identity() {
    let entries = make_entries(2);
    let a = Chunk::new(entries.clone());
    let mut b = Chunk::new(entries);

    b.increment_retry_count();
    b.increment_retry_count();

    assert_eq!(b.retry_count(), 2);
    assert_eq!(a, b);

    // The retried chunk still hits the same slot in a set
    let mut in_flight = HashSet::new();
    in_flight.insert(a);
    assert!(in_flight.contains(&b));
    assert!(in_flight.remove(&b));
    assert!(in_flight.is_empty());
}

#[test]
fn test_retry_count_increments_by_one() {
    let mut chunk = Chunk::new(make_entries(1));
    assert_eq!(chunk.retry_count(), 0);

    for expected in 1..=4 {
        chunk.increment_retry_count();
        assert_eq!(chunk.retry_count(), expected);
    }
}

#[test]
fn test_total_payload_bytes() {
    let chunk = Chunk::new(make_entries(5));
    assert_eq!(chunk.total_payload_bytes(), 50);
    assert_eq!(chunk.len(), 5);
    assert!(!chunk.is_empty());

    let empty = Chunk::new(Vec::new());
    assert_eq!(empty.total_payload_bytes(), 0);
    assert!(empty.is_empty());
}

#[test]
fn test_contains() {
    let entries = make_entries(3);
    let outsider = LogEntry::new("pv", Utc::now());
    let chunk = Chunk::new(entries.clone());

    for entry in &entries {
        assert!(chunk.contains(entry.identifier()));
    }
    assert!(!chunk.contains(outsider.identifier()));
}
