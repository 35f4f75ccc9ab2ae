// Prometheus pull output
//
// Binds the listen address and serves scrapes for the life of the process.
// Nothing is collected between scrapes.

use std::sync::Arc;

use async_trait::async_trait;

use unpoller_core::{Collect, Output, PollerError};

use crate::config::PromConfig;
use crate::server::{self, AppState};

pub const PLUGIN_NAME: &str = "prometheus";

pub struct PromOutput {
    config: PromConfig,
}

impl PromOutput {
    pub fn new(config: PromConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PromConfig {
        &self.config
    }
}

fn output_error(err: &anyhow::Error) -> PollerError {
    PollerError::Output {
        plugin: PLUGIN_NAME.into(),
        message: format!("{err:#}"),
    }
}

#[async_trait]
impl Output for PromOutput {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn run(&self, collect: Arc<dyn Collect>) -> Result<(), PollerError> {
        if self.config.disable {
            collect.log_debugf(
                PLUGIN_NAME,
                format_args!("Prometheus config missing (or disabled), Prometheus output disabled!"),
            );
            return Ok(());
        }

        let addr = self.config.bind_addr();
        let listener = server::bind(&addr).await.map_err(|e| output_error(&e))?;

        collect.logf(
            PLUGIN_NAME,
            format_args!(
                "Prometheus exported at http://{addr}/ - namespace: {}",
                self.config.namespace()
            ),
        );

        let state = Arc::new(AppState {
            collect,
            config: self.config.clone(),
        });

        server::serve(listener, state)
            .await
            .map_err(|e| output_error(&e))
    }
}
