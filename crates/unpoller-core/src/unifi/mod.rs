// UniFi controller input
//
// Polls every configured controller on request, and on a targeted scrape
// either finds the configured controller by role or URL or creates a
// dynamic one from the default template.

mod augment;
mod collector;
mod config;
mod pii;
mod session;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info};

pub use augment::augment_metrics;
pub use config::{
    ControllerConfig, DEFAULT_PASS, DEFAULT_SITE, DEFAULT_URL, DEFAULT_USER, UnifiConfig,
};
pub use pii::{redact_event, redact_mac, redact_name};
pub use session::Controller;

use crate::collect::Input;
use crate::error::PollerError;
use crate::filter::Filter;
use crate::metrics::{Collected, Events, Metrics, append_metrics};
use collector::RawKind;

pub const PLUGIN_NAME: &str = "unifi";

/// The UniFi input plugin.
pub struct UnifiInput {
    disable: bool,
    dynamic: bool,
    defaults: ControllerConfig,
    controllers: Vec<Arc<Controller>>,
    /// Dynamic controllers by URL; entries live for the whole process.
    dynamic_cache: RwLock<HashMap<String, Arc<Controller>>>,
}

impl UnifiInput {
    pub fn new(config: UnifiConfig) -> Self {
        Self {
            disable: config.disable,
            dynamic: config.dynamic,
            defaults: config.defaults,
            controllers: config
                .controllers
                .into_iter()
                .map(|c| Arc::new(Controller::new(c)))
                .collect(),
            dynamic_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn controllers(&self) -> &[Arc<Controller>] {
        &self.controllers
    }

    /// Number of dynamic controllers created so far.
    pub async fn dynamic_count(&self) -> usize {
        self.dynamic_cache.read().await.len()
    }

    /// The controller a targeted filter names: a configured one matched by
    /// role (or URL when no role is given), else a dynamic one.
    async fn targeted(&self, filter: &Filter) -> Result<Arc<Controller>, PollerError> {
        let configured = self.controllers.iter().find(|c| {
            if filter.role.is_empty() {
                c.url().eq_ignore_ascii_case(&filter.path)
            } else {
                c.config().role().eq_ignore_ascii_case(&filter.role)
            }
        });
        if let Some(controller) = configured {
            return Ok(Arc::clone(controller));
        }

        if !self.dynamic {
            return Err(PollerError::DynamicDisabled);
        }
        self.dynamic_controller(&filter.path).await
    }

    /// Find or create the dynamic controller for `path`. Creation is
    /// double-checked under the write lock so each URL is inserted once.
    async fn dynamic_controller(&self, path: &str) -> Result<Arc<Controller>, PollerError> {
        if !path.starts_with("http") {
            return Err(PollerError::ScrapeFilterMatchFailed {
                path: path.to_owned(),
            });
        }

        if let Some(controller) = self.dynamic_cache.read().await.get(path) {
            return Ok(Arc::clone(controller));
        }

        let mut cache = self.dynamic_cache.write().await;
        let controller = cache.entry(path.to_owned()).or_insert_with(|| {
            info!("Adding Dynamic UniFi Controller: {path}");
            Arc::new(Controller::new(self.defaults.for_url(path)))
        });
        Ok(Arc::clone(controller))
    }

    async fn log_controller(&self, controller: &Controller) {
        let config = controller.config();
        let version = match controller.session().await {
            Some(client) => client
                .server_version()
                .await
                .unwrap_or_else(|_| "unknown".into()),
            None => "unknown".into(),
        };
        info!(
            "Polling UniFi Controller at {} v{version} as user {}. Sites: {}",
            config.url,
            config.user,
            controller.sites().await.join(", ")
        );
        info!(
            "=> Hash PII {} / Drop PII {} / Verify SSL {} / Save DPI {} / Save IDS {} / \
             Save Events {} / Save Alarms {} / Save Anomalies {} / Save Sites {}",
            config.hash_pii,
            config.drop_pii,
            config.verify_ssl,
            config.save_dpi,
            config.save_ids,
            config.save_events,
            config.save_alarms,
            config.save_anomalies,
            config.save_sites
        );
    }
}

#[async_trait]
impl Input for UnifiInput {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn initialize(&self) -> Result<(), PollerError> {
        if self.disable {
            info!("UniFi input plugin disabled or missing configuration!");
            return Ok(());
        }
        if self.dynamic {
            info!("Dynamic UniFi Controller enabled: scrapes may name unconfigured controllers");
        }
        if self.controllers.is_empty() {
            if self.dynamic {
                info!("No controllers configured. Polling dynamic controllers only!");
                return Ok(());
            }
            return Err(PollerError::NoControllers);
        }

        for controller in &self.controllers {
            let client = match controller.reauthenticate().await {
                Ok(client) => client,
                Err(err) => {
                    error!("Controller Auth or Connection Error, continuing to retry: {err}");
                    continue;
                }
            };
            if let Err(err) = controller.check_sites(&client).await {
                error!("checking sites on {}: {err}", controller.url());
            }
            self.log_controller(controller).await;
        }

        Ok(())
    }

    async fn metrics(&self, filter: &Filter) -> Collected<Option<Metrics>> {
        if self.disable {
            return Collected::ok(None);
        }

        if filter.is_targeted() {
            let result = match self.targeted(filter).await {
                Ok(controller) => collector::collect_controller(&controller, filter).await,
                Err(err) => Err(err),
            };
            return match result {
                Ok(metrics) => Collected::ok(Some(metrics)),
                Err(err) => Collected::failed(None, err),
            };
        }

        let mut merged = None;
        let mut errors = Vec::new();
        for controller in &self.controllers {
            match collector::collect_controller(controller, filter).await {
                Ok(metrics) => merged = append_metrics(merged, Some(metrics)),
                Err(err) => {
                    error!("Collecting metrics from {}: {err}", controller.url());
                    errors.push(err);
                }
            }
        }

        Collected {
            data: merged,
            error: PollerError::join(errors),
        }
    }

    async fn events(&self, filter: &Filter) -> Collected<Option<Events>> {
        if self.disable {
            return Collected::ok(None);
        }

        let mut merged: Option<Events> = None;
        let mut errors = Vec::new();
        let selected = self
            .controllers
            .iter()
            .filter(|c| filter.path.is_empty() || c.url().eq_ignore_ascii_case(&filter.path));

        for controller in selected {
            match collector::collect_events(controller, filter).await {
                Ok(events) => merged.get_or_insert_with(Events::default).append(events),
                Err(err) => {
                    error!("Collecting events from {}: {err}", controller.url());
                    errors.push(err);
                }
            }
        }

        Collected {
            data: merged,
            error: PollerError::join(errors),
        }
    }

    async fn raw_metrics(&self, filter: &Filter) -> Result<String, PollerError> {
        let controller = self
            .controllers
            .get(filter.unit)
            .ok_or(PollerError::ControllerIndexOutOfRange)?;
        let kind = RawKind::parse(&filter.kind)?;
        collector::raw_metrics(controller, kind, &filter.path).await
    }
}
