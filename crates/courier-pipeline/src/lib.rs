//! Courier - Pipeline
//!
//! The orchestrator that connects posted events to filters and outputs.
//!
//! # Architecture
//!
//! ```text
//! post_log(payload, tag)
//!     │
//!     ├──→ [Filter pv.*]  ──→ entries     (every matching filter, in order)
//!     ├──→ [Filter act.*] ──→ entries
//!     │
//!     └──→ for each entry, for each matching output:
//!              [Output pv.*]  ← BufferedOutput → Sink
//!              [Output **]    ← BufferedOutput → Sink
//! ```
//!
//! # Key Design
//!
//! - **Independent matching passes**: which filter produced an entry and
//!   which output receives it are unrelated; every matching output
//!   receives every produced entry.
//! - **Single ordering point**: the routing fan-out is serialized, so
//!   concurrent `post_log` calls never interleave one output's buffer
//!   mutations.
//! - **Factory settings**: routes are registered as (pattern, factory)
//!   pairs and resolved at construction; any factory failure aborts
//!   construction.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier_output::{BufferedOutput, NullSink};
//! use courier_pipeline::{FilterSetting, JsonFilter, Logger, LoggerConfig, OutputSetting};
//! use courier_routing::TagPattern;
//! use courier_store::MemoryLogStore;
//!
//! let config = LoggerConfig::new(Arc::new(MemoryLogStore::new()))
//!     .with_filter(FilterSetting::new(|| {
//!         Ok(Box::new(JsonFilter::new(TagPattern::parse("pv.*")?)))
//!     }))
//!     .with_output(OutputSetting::new(|store, clock| {
//!         Ok(Box::new(BufferedOutput::spawn(
//!             TagPattern::parse("pv.*")?,
//!             Arc::new(NullSink::new()),
//!             store,
//!             clock,
//!         )))
//!     }));
//!
//! let logger = Logger::new(config).await?;
//! logger.post_log(Some(&serde_json::json!({"page": "home"})), "pv.top").await;
//! ```

mod error;
mod filter;
mod logger;
mod settings;

pub use error::{FilterError, PipelineError, Result};
pub use filter::{Filter, JsonFilter};
pub use logger::{Logger, LoggerConfig};
pub use settings::{FilterSetting, OutputSetting};


#[cfg(test)]
#[path = "logger_test.rs"]
mod logger_test;
