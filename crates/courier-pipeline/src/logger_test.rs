//! Tests for Logger
//!
//! Routing semantics: independent filter and output matching passes, and
//! the lifecycle around them. Fixtures are built per test; no shared
//! state.

use std::sync::Arc;

use async_trait::async_trait;
use courier_output::Output;
use courier_protocol::LogEntry;
use courier_routing::TagPattern;
use courier_store::MemoryLogStore;
use parking_lot::Mutex;
use serde_json::json;

use crate::{
    Filter, FilterSetting, JsonFilter, Logger, LoggerConfig, OutputSetting, PipelineError,
};

/// Unbuffered output that collects everything it receives
struct CollectingOutput {
    tag_pattern: TagPattern,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

#[async_trait]
impl Output for CollectingOutput {
    fn tag_pattern(&self) -> &TagPattern {
        &self.tag_pattern
    }

    async fn emit(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}

/// Filter whose conversion always fails
struct BrokenFilter {
    tag_pattern: TagPattern,
}

impl Filter for BrokenFilter {
    fn tag_pattern(&self) -> &TagPattern {
        &self.tag_pattern
    }

    fn convert_to_logs(
        &self,
        _payload: Option<&serde_json::Value>,
        _tag: &str,
        _captured: Option<&str>,
        _clock: &dyn courier_protocol::Clock,
    ) -> Result<Vec<LogEntry>, crate::FilterError> {
        Err(crate::FilterError::conversion("broken on purpose"))
    }
}

fn json_filter_setting(pattern: &str) -> FilterSetting {
    let pattern = pattern.to_owned();
    FilterSetting::new(move || Ok(Box::new(JsonFilter::new(TagPattern::parse(&pattern)?))))
}

fn collecting_output_setting(
    pattern: &str,
) -> (OutputSetting, Arc<Mutex<Vec<LogEntry>>>) {
    let entries: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&entries);
    let pattern = pattern.to_owned();
    let setting = OutputSetting::new(move |_store, _clock| {
        Ok(Box::new(CollectingOutput {
            tag_pattern: TagPattern::parse(&pattern)?,
            entries: Arc::clone(&sink),
        }))
    });
    (setting, entries)
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_single_route() {
    let (output, collected) = collecting_output_setting("pv");
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("pv"))
        .with_output(output);
    let logger = Logger::new(config).await.unwrap();

    let payload = json!({"page_name": "Top", "user_id": 100});
    logger.post_log(Some(&payload), "pv").await;

    let entries = collected.lock();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tag(), "pv");

    let decoded: serde_json::Value =
        serde_json::from_slice(entries[0].payload().unwrap()).unwrap();
    assert_eq!(decoded, payload);
}

#[tokio::test]
async fn test_routes_match_independently() {
    let (pv, pv_collected) = collecting_output_setting("pv");
    let (pv2, pv2_collected) = collecting_output_setting("pv2");
    let (pv_any, pv_any_collected) = collecting_output_setting("pv.*");

    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("pv"))
        .with_filter(json_filter_setting("pv2"))
        .with_filter(json_filter_setting("pv.*"))
        .with_output(pv)
        .with_output(pv2)
        .with_output(pv_any);
    let logger = Logger::new(config).await.unwrap();

    let payload = json!({"page_name": "Top", "user_id": 100});
    logger.post_log(Some(&payload), "pv.top").await;
    logger.post_log(Some(&payload), "pv2").await;
    logger.post_log(Some(&payload), "pv2").await;

    assert_eq!(pv_collected.lock().len(), 0);
    assert_eq!(pv2_collected.lock().len(), 2);
    assert_eq!(pv_any_collected.lock().len(), 1);
}

#[tokio::test]
async fn test_every_matching_output_receives_every_entry() {
    // Two filters and two outputs all match the tag: each output sees
    // both produced entries regardless of which filter produced them
    let (first, first_collected) = collecting_output_setting("pv.*");
    let (second, second_collected) = collecting_output_setting("pv.**");

    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("pv.*"))
        .with_filter(json_filter_setting("pv.**"))
        .with_output(first)
        .with_output(second);
    let logger = Logger::new(config).await.unwrap();

    logger.post_log(Some(&json!({"n": 1})), "pv.top").await;

    assert_eq!(first_collected.lock().len(), 2);
    assert_eq!(second_collected.lock().len(), 2);

    // Both outputs received the same two entries
    let first_ids: Vec<_> = first_collected.lock().iter().map(LogEntry::identifier).collect();
    let second_ids: Vec<_> = second_collected.lock().iter().map(LogEntry::identifier).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_unmatched_tag_produces_nothing() {
    let (output, collected) = collecting_output_setting("pv.*");
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("pv.*"))
        .with_output(output);
    let logger = Logger::new(config).await.unwrap();

    logger.post_log(Some(&json!({"n": 1})), "other").await;

    assert!(collected.lock().is_empty());
}

#[tokio::test]
async fn test_broken_filter_is_skipped() {
    let (output, collected) = collecting_output_setting("pv");
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(FilterSetting::new(|| {
            Ok(Box::new(BrokenFilter {
                tag_pattern: TagPattern::parse("pv")?,
            }))
        }))
        .with_filter(json_filter_setting("pv"))
        .with_output(output);
    let logger = Logger::new(config).await.unwrap();

    logger.post_log(Some(&json!({"n": 1})), "pv").await;

    // The broken filter contributes nothing; the healthy one still does
    assert_eq!(collected.lock().len(), 1);
}

// =============================================================================
// Construction and lifecycle
// =============================================================================

#[tokio::test]
async fn test_output_factory_failure_aborts_construction() {
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_output(OutputSetting::new(|_store, _clock| {
            Err(PipelineError::output_setup("boom"))
        }));

    let result = Logger::new(config).await;
    assert!(matches!(result, Err(PipelineError::OutputSetup(_))));
}

#[tokio::test]
async fn test_filter_factory_failure_aborts_construction() {
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(FilterSetting::new(|| {
            Err(PipelineError::filter_setup("boom"))
        }));

    let result = Logger::new(config).await;
    assert!(matches!(result, Err(PipelineError::FilterSetup(_))));
}

#[tokio::test]
async fn test_invalid_pattern_in_factory_surfaces_at_construction() {
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("*.b.*"));

    let result = Logger::new(config).await;
    assert!(matches!(result, Err(PipelineError::Pattern(_))));
}

#[tokio::test]
async fn test_post_log_after_shutdown_is_dropped() {
    let (output, collected) = collecting_output_setting("pv");
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("pv"))
        .with_output(output);
    let mut logger = Logger::new(config).await.unwrap();

    logger.post_log(Some(&json!({"n": 1})), "pv").await;
    logger.shutdown().await;
    logger.post_log(Some(&json!({"n": 2})), "pv").await;

    assert_eq!(collected.lock().len(), 1);

    // Shutting down twice is a no-op
    logger.shutdown().await;
}

#[tokio::test]
async fn test_suspend_and_resume_round_trip() {
    let (output, collected) = collecting_output_setting("pv");
    let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
        .with_filter(json_filter_setting("pv"))
        .with_output(output);
    let logger = Logger::new(config).await.unwrap();

    logger.suspend().await;
    // Posting while suspended still routes; only timers are stopped
    logger.post_log(Some(&json!({"n": 1})), "pv").await;
    logger.resume().await.unwrap();
    logger.post_log(Some(&json!({"n": 2})), "pv").await;

    assert_eq!(collected.lock().len(), 2);
}
