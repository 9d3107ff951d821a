//! Logger - the pipeline orchestrator
//!
//! Owns the filters and outputs for its lifetime, routes every posted
//! event through both matching passes, and drives the shared lifecycle.

use std::sync::Arc;

use courier_output::Output;
use courier_protocol::{Clock, LogEntry, SystemClock};
use courier_store::LogStore;
use serde_json::Value;

use crate::error::Result;
use crate::filter::Filter;
use crate::settings::{FilterSetting, OutputSetting};

/// Orchestrator lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Suspended,
    Shutdown,
}

/// Configuration for a [`Logger`]
///
/// Routes are ordered: filters and outputs are built and consulted in
/// registration order.
pub struct LoggerConfig {
    log_store: Arc<dyn LogStore>,
    clock: Arc<dyn Clock>,
    filter_settings: Vec<FilterSetting>,
    output_settings: Vec<OutputSetting>,
}

impl LoggerConfig {
    /// Create a configuration around a shared log store
    ///
    /// Uses the system clock unless [`with_clock`] overrides it.
    ///
    /// [`with_clock`]: LoggerConfig::with_clock
    pub fn new(log_store: Arc<dyn LogStore>) -> Self {
        Self {
            log_store,
            clock: Arc::new(SystemClock::new()),
            filter_settings: Vec::new(),
            output_settings: Vec::new(),
        }
    }

    /// Override the clock used for timestamping and flush timing
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a filter route (order matters)
    #[must_use]
    pub fn with_filter(mut self, setting: FilterSetting) -> Self {
        self.filter_settings.push(setting);
        self
    }

    /// Register an output route (order matters)
    #[must_use]
    pub fn with_output(mut self, setting: OutputSetting) -> Self {
        self.output_settings.push(setting);
        self
    }
}

/// The pipeline orchestrator
///
/// Construction prepares the log store, resolves every route factory in
/// registration order, and starts every output; any failure along the way
/// is fatal and nothing is left running.
pub struct Logger {
    filters: Vec<Box<dyn Filter>>,
    outputs: Vec<Box<dyn Output>>,
    clock: Arc<dyn Clock>,
    state: parking_lot::Mutex<Lifecycle>,

    /// The single ordering point: the routing fan-out for concurrent
    /// `post_log` calls is serialized here so one output's buffer never
    /// sees interleaved mutations from two events
    route_lock: tokio::sync::Mutex<()>,
}

impl Logger {
    /// Build and start the pipeline
    pub async fn new(config: LoggerConfig) -> Result<Self> {
        config.log_store.prepare().await?;

        let filters = config
            .filter_settings
            .iter()
            .map(FilterSetting::make_filter)
            .collect::<Result<Vec<_>>>()?;

        let outputs = config
            .output_settings
            .iter()
            .map(|setting| {
                setting.make_output(Arc::clone(&config.log_store), Arc::clone(&config.clock))
            })
            .collect::<Result<Vec<_>>>()?;

        for output in &outputs {
            output.start().await?;
        }

        tracing::info!(
            filters = filters.len(),
            outputs = outputs.len(),
            "pipeline started"
        );

        Ok(Self {
            filters,
            outputs,
            clock: config.clock,
            state: parking_lot::Mutex::new(Lifecycle::Running),
            route_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// The pipeline's shared clock
    #[inline]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Post one event into the pipeline
    ///
    /// Every filter whose pattern matches `tag` converts the payload, in
    /// registration order; every output whose pattern matches receives
    /// every produced entry. Fire-and-forget: conversion and delivery
    /// failures are handled internally.
    pub async fn post_log(&self, payload: Option<&Value>, tag: &str) {
        let _guard = self.route_lock.lock().await;

        if *self.state.lock() == Lifecycle::Shutdown {
            tracing::warn!(tag, "post_log after shutdown, dropping event");
            return;
        }

        let entries = self.filtered_logs(payload, tag);
        if entries.is_empty() {
            return;
        }

        for entry in entries {
            for output in self
                .outputs
                .iter()
                .filter(|output| output.tag_pattern().matches(tag).is_some())
            {
                output.emit(entry.clone()).await;
            }
        }
    }

    fn filtered_logs(&self, payload: Option<&Value>, tag: &str) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        for filter in &self.filters {
            let Some(matched) = filter.tag_pattern().matches(tag) else {
                continue;
            };
            match filter.convert_to_logs(payload, tag, matched.captured(), self.clock.as_ref()) {
                Ok(produced) => entries.extend(produced),
                Err(error) => {
                    tracing::warn!(
                        tag,
                        pattern = %filter.tag_pattern(),
                        %error,
                        "filter conversion failed, event contributes no entries"
                    );
                }
            }
        }
        entries
    }

    /// Run one flush pass on every output
    ///
    /// Useful on app-background transitions to push everything buffered
    /// toward the sinks before the process may be frozen.
    pub async fn flush_all(&self) {
        for output in &self.outputs {
            output.flush().await;
        }
    }

    /// Stop every output's timer; returns once all are stopped
    pub async fn suspend(&self) {
        for output in &self.outputs {
            output.suspend().await;
        }
        *self.state.lock() = Lifecycle::Suspended;
        tracing::debug!("pipeline suspended");
    }

    /// Reload pending buffers and re-arm every output's timer
    pub async fn resume(&self) -> Result<()> {
        for output in &self.outputs {
            output.resume().await?;
        }
        *self.state.lock() = Lifecycle::Running;
        tracing::debug!("pipeline resumed");
        Ok(())
    }

    /// Suspend, then release all filters and outputs
    pub async fn shutdown(&mut self) {
        if *self.state.lock() == Lifecycle::Shutdown {
            return;
        }
        self.filters.clear();
        self.suspend().await;
        for output in &self.outputs {
            output.shutdown().await;
        }
        self.outputs.clear();
        *self.state.lock() = Lifecycle::Shutdown;
        tracing::info!("pipeline shut down");
    }
}
