// ── Plugin contracts ──
//
// Inputs produce data, outputs consume it, and `Collect` is the capability
// an output receives so it can ask the inputs for data without owning them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PollerError;
use crate::filter::Filter;
use crate::metrics::{Collected, Events, Metrics};

/// A data source polled on behalf of the outputs.
#[async_trait]
pub trait Input: Send + Sync {
    fn name(&self) -> &str;

    /// Called once at startup. Authentication failures are logged and
    /// retried on the next poll rather than returned.
    async fn initialize(&self) -> Result<(), PollerError>;

    /// A bundle from every controller the filter selects. `data` is `None`
    /// when nothing matched.
    async fn metrics(&self, filter: &Filter) -> Collected<Option<Metrics>>;

    async fn events(&self, filter: &Filter) -> Collected<Option<Events>>;

    /// Raw controller JSON for the debug dump.
    async fn raw_metrics(&self, filter: &Filter) -> Result<String, PollerError>;
}

/// A long-running sink. `run` owns its own scheduling and is expected to
/// block for the life of the process; a disabled output returns `Ok` at once.
#[async_trait]
pub trait Output: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, collect: Arc<dyn Collect>) -> Result<(), PollerError>;
}

/// What an output may ask of the poller.
#[async_trait]
pub trait Collect: Send + Sync {
    /// Metrics from every input and controller.
    async fn metrics(&self) -> Collected<Metrics> {
        self.metrics_from(&Filter::default()).await
    }

    async fn metrics_from(&self, filter: &Filter) -> Collected<Metrics>;

    async fn events(&self, filter: &Filter) -> Collected<Events>;

    /// Registered input names, in registration order.
    fn inputs(&self) -> Vec<String>;

    /// Registered output names, in registration order.
    fn outputs(&self) -> Vec<String>;

    /// Informational message; suppressed when quiet.
    fn logf(&self, plugin: &str, args: fmt::Arguments<'_>);

    /// Error message; always emitted.
    fn log_errorf(&self, plugin: &str, args: fmt::Arguments<'_>);

    /// Debug message; emitted only when debug is on and quiet is off.
    fn log_debugf(&self, plugin: &str, args: fmt::Arguments<'_>);
}
