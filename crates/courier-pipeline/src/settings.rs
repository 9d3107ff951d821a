//! Route settings - factories resolved at construction
//!
//! Routes are registered as factory closures so the orchestrator controls
//! when plugins are built and which store and clock they receive. A
//! factory error aborts construction.

use std::sync::Arc;

use courier_output::Output;
use courier_protocol::Clock;
use courier_store::LogStore;

use crate::error::Result;
use crate::filter::Filter;

/// Factory for one registered filter route
pub struct FilterSetting {
    make: Box<dyn Fn() -> Result<Box<dyn Filter>> + Send + Sync>,
}

impl FilterSetting {
    /// Register a filter factory
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Filter>> + Send + Sync + 'static,
    {
        Self {
            make: Box::new(make),
        }
    }

    pub(crate) fn make_filter(&self) -> Result<Box<dyn Filter>> {
        (self.make)()
    }
}

/// Factory for one registered output route
///
/// The factory receives the pipeline's shared log store and clock, the
/// way buffered outputs expect to be spawned.
pub struct OutputSetting {
    #[allow(clippy::type_complexity)]
    make: Box<dyn Fn(Arc<dyn LogStore>, Arc<dyn Clock>) -> Result<Box<dyn Output>> + Send + Sync>,
}

impl OutputSetting {
    /// Register an output factory
    pub fn new<F>(make: F) -> Self
    where
        F: Fn(Arc<dyn LogStore>, Arc<dyn Clock>) -> Result<Box<dyn Output>> + Send + Sync + 'static,
    {
        Self {
            make: Box::new(make),
        }
    }

    pub(crate) fn make_output(
        &self,
        store: Arc<dyn LogStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Box<dyn Output>> {
        (self.make)(store, clock)
    }
}
