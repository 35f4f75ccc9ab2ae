// ── Plugin registries ──
//
// `Poller` owns the input and output plugins chosen in `main`. It runs
// every output concurrently and answers their `Collect` requests by
// fanning out to the matching inputs.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use unpoller_api::Devices;

use crate::collect::{Collect, Input, Output};
use crate::error::PollerError;
use crate::filter::Filter;
use crate::metrics::{Collected, Events, Metrics, append_metrics};

/// Input and output registries plus the shared log switches.
#[derive(Default)]
pub struct Poller {
    inputs: Vec<Arc<dyn Input>>,
    outputs: Vec<Arc<dyn Output>>,
    debug: bool,
    quiet: bool,
}

impl Poller {
    pub fn new(debug: bool, quiet: bool) -> Self {
        Self {
            debug,
            quiet,
            ..Self::default()
        }
    }

    pub fn register_input(&mut self, input: Arc<dyn Input>) {
        debug!(input = input.name(), "registered input plugin");
        self.inputs.push(input);
    }

    pub fn register_output(&mut self, output: Arc<dyn Output>) {
        debug!(output = output.name(), "registered output plugin");
        self.outputs.push(output);
    }

    /// Initialize every input concurrently; all failures are joined.
    pub async fn initialize_inputs(&self) -> Result<(), PollerError> {
        info!("Loaded {} input plugin(s): {}", self.inputs.len(), self.inputs().join(", "));

        let results = join_all(self.inputs.iter().map(|input| input.initialize())).await;
        let errors: Vec<PollerError> = results.into_iter().filter_map(Result::err).collect();

        match PollerError::join(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Launch every output and wait. The first output error is returned;
    /// once every output has returned cleanly the poller has nothing left
    /// to do and reports `AllOutputsStopped`.
    pub async fn run_outputs(self: &Arc<Self>) -> Result<(), PollerError> {
        if self.outputs.is_empty() {
            return Err(PollerError::NoOutputs);
        }

        info!("Loaded {} output plugin(s): {}", self.outputs.len(), self.outputs().join(", "));

        let collect: Arc<dyn Collect> = Arc::<Self>::clone(self);
        let mut tasks = JoinSet::new();
        for output in &self.outputs {
            let output = Arc::clone(output);
            let collect = Arc::clone(&collect);
            tasks.spawn(async move {
                let name = output.name().to_owned();
                (name, output.run(collect).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Err(err))) => return Err(err),
                Ok((name, Ok(()))) => debug!(output = %name, "output plugin returned"),
                Err(join_err) => {
                    return Err(PollerError::Output {
                        plugin: "unknown".into(),
                        message: join_err.to_string(),
                    });
                }
            }
        }

        Err(PollerError::AllOutputsStopped)
    }

    /// Look up a registered input by name, case-insensitively.
    pub fn input(&self, name: &str) -> Option<Arc<dyn Input>> {
        self.inputs
            .iter()
            .find(|input| input.name().eq_ignore_ascii_case(name))
            .cloned()
    }
}

#[async_trait]
impl Collect for Poller {
    async fn metrics_from(&self, filter: &Filter) -> Collected<Metrics> {
        let mut merged: Option<Metrics> = None;
        let mut errors = Vec::new();

        for input in self.inputs.iter().filter(|i| filter.matches_input(i.name())) {
            let collected = input.metrics(filter).await;
            merged = append_metrics(merged, collected.data);
            errors.extend(collected.error);
        }

        let mut metrics = merged.unwrap_or_else(|| Metrics {
            ts: Utc::now(),
            ..Metrics::default()
        });
        metrics.devices.get_or_insert_with(Devices::default);

        Collected {
            data: metrics,
            error: PollerError::join(errors),
        }
    }

    async fn events(&self, filter: &Filter) -> Collected<Events> {
        let mut merged = Events::default();
        let mut errors = Vec::new();

        for input in self.inputs.iter().filter(|i| filter.matches_input(i.name())) {
            let collected = input.events(filter).await;
            if let Some(events) = collected.data {
                merged.append(events);
            }
            errors.extend(collected.error);
        }

        Collected {
            data: merged,
            error: PollerError::join(errors),
        }
    }

    fn inputs(&self) -> Vec<String> {
        self.inputs.iter().map(|i| i.name().to_owned()).collect()
    }

    fn outputs(&self) -> Vec<String> {
        self.outputs.iter().map(|o| o.name().to_owned()).collect()
    }

    fn logf(&self, plugin: &str, args: fmt::Arguments<'_>) {
        if !self.quiet {
            info!(plugin, "{args}");
        }
    }

    fn log_errorf(&self, plugin: &str, args: fmt::Arguments<'_>) {
        error!(plugin, "{args}");
    }

    fn log_debugf(&self, plugin: &str, args: fmt::Arguments<'_>) {
        if self.debug && !self.quiet {
            debug!(plugin, "{args}");
        }
    }
}
