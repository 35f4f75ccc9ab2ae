// Controller sessions
//
// One `Controller` per configured or dynamic upstream. The session is
// `None` until a login succeeds and is replaced wholesale on re-auth, so
// a stale cookie jar never outlives a failed login.

use tokio::sync::RwLock;
use tracing::{error, info};

use unpoller_api::{ControllerClient, Site};

use super::config::{ControllerConfig, DEFAULT_SITE};
use crate::error::PollerError;

/// Configuration plus live session for one controller.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    session: RwLock<Option<ControllerClient>>,
    /// Configured sites, narrowed by [`check_sites`](Self::check_sites).
    sites: RwLock<Vec<String>>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        let sites = RwLock::new(config.sites.clone());
        Self {
            config,
            session: RwLock::new(None),
            sites,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub async fn sites(&self) -> Vec<String> {
        self.sites.read().await.clone()
    }

    /// The current session, if the last login succeeded.
    pub async fn session(&self) -> Option<ControllerClient> {
        self.session.read().await.clone()
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in again, replacing any existing session. On failure the
    /// session is cleared.
    pub async fn reauthenticate(&self) -> Result<ControllerClient, PollerError> {
        let mut session = self.session.write().await;
        *session = None;
        let client = self.login().await?;
        *session = Some(client.clone());
        Ok(client)
    }

    /// The current session, logging in first if there is none. Concurrent
    /// callers on a fresh controller share a single login.
    pub async fn ensure_session(&self) -> Result<ControllerClient, PollerError> {
        if let Some(client) = self.session().await {
            return Ok(client);
        }

        let mut session = self.session.write().await;
        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }

        info!("Authenticating to UniFi Controller: {}", self.config.url);
        let client = self.login().await?;
        *session = Some(client.clone());
        Ok(client)
    }

    async fn login(&self) -> Result<ControllerClient, PollerError> {
        ControllerClient::connect(
            &self.config.url,
            &self.config.user,
            &self.config.pass,
            &self.config.transport(),
        )
        .await
        .map_err(PollerError::auth(&self.config.url))
    }

    // ── Sites ────────────────────────────────────────────────────────

    /// Narrow the configured sites to those the controller has. Missing
    /// sites are logged, never fatal; the list is never left empty.
    pub async fn check_sites(&self, client: &ControllerClient) -> Result<(), PollerError> {
        let mut configured = self.sites.write().await;
        if configured.is_empty() || configured.iter().all(String::is_empty) {
            *configured = vec![DEFAULT_SITE.to_owned()];
        }

        let found = client
            .get_sites()
            .await
            .map_err(PollerError::collection("unifi.GetSites", &self.config.url))?;

        let names: Vec<String> = found
            .iter()
            .map(|s| format!("{} ({})", s.name, s.desc))
            .collect();
        info!(
            "Found {} site(s) on controller {}: {}",
            found.len(),
            self.config.url,
            names.join(", ")
        );

        if configured.iter().any(|s| s == DEFAULT_SITE) {
            *configured = vec![DEFAULT_SITE.to_owned()];
            return Ok(());
        }

        let mut keep = Vec::with_capacity(configured.len());
        for name in configured.iter() {
            if found.iter().any(|s| &s.name == name) {
                keep.push(name.clone());
            } else {
                error!(
                    "Configured site not found on controller {}: {name}",
                    self.config.url
                );
            }
        }

        if keep.is_empty() {
            keep.push(DEFAULT_SITE.to_owned());
        }
        *configured = keep;
        Ok(())
    }

    /// The controller's sites reduced to the configured ones, in controller order.
    pub async fn filtered_sites(&self, client: &ControllerClient) -> Result<Vec<Site>, PollerError> {
        let sites = client
            .get_sites()
            .await
            .map_err(PollerError::collection("unifi.GetSites", &self.config.url))?;

        let configured = self.sites.read().await;
        if configured.is_empty() || configured.iter().any(|s| s == DEFAULT_SITE) {
            return Ok(sites);
        }

        Ok(sites
            .into_iter()
            .filter(|site| configured.contains(&site.name))
            .collect())
    }
}
