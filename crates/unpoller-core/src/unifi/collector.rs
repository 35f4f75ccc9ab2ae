// Collection engine
//
// Per-controller polling in a fixed order (sites, DPI, IDS, clients,
// devices) so augmentation sees one consistent snapshot. A failed poll
// earns exactly one re-authentication and one more try.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing::{debug, error, warn};

use unpoller_api::{ControllerClient, Site};

use super::augment::augment_metrics;
use super::pii::redact_event;
use super::session::Controller;
use crate::error::PollerError;
use crate::filter::Filter;
use crate::metrics::{Events, LogEntry, Metrics};

const DEFAULT_EVENT_WINDOW: Duration = Duration::from_secs(60);

/// Raw dump selectors accepted by `--dumpjson`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawKind {
    Devices,
    Clients,
    Other,
}

impl RawKind {
    pub(crate) fn parse(kind: &str) -> Result<Self, PollerError> {
        match kind {
            "d" | "device" | "devices" => Ok(Self::Devices),
            "c" | "client" | "clients" => Ok(Self::Clients),
            "o" | "other" => Ok(Self::Other),
            _ => Err(PollerError::UnknownKind),
        }
    }

    fn site_path(self) -> &'static str {
        match self {
            Self::Devices => "stat/device",
            Self::Clients | Self::Other => "stat/sta",
        }
    }
}

/// Poll one controller, re-authenticating once if the first attempt fails.
pub(crate) async fn collect_controller(
    controller: &Controller,
    filter: &Filter,
) -> Result<Metrics, PollerError> {
    let client = controller.ensure_session().await?;

    match poll_controller(controller, &client, filter).await {
        Ok(metrics) => Ok(metrics),
        Err(err) => {
            error!("polling {}: {err}; re-authenticating", controller.url());
            let client = controller.reauthenticate().await?;
            poll_controller(controller, &client, filter).await
        }
    }
}

async fn poll_controller(
    controller: &Controller,
    client: &ControllerClient,
    filter: &Filter,
) -> Result<Metrics, PollerError> {
    let config = controller.config();
    let url = controller.url();
    debug!("Polling controller: {url}");

    let sites = controller.filtered_sites(client).await?;
    let mut metrics = Metrics {
        ts: Utc::now(),
        sites: sites.clone(),
        ..Metrics::default()
    };

    if config.save_dpi {
        metrics.sites_dpi = client
            .get_site_dpi(&sites)
            .await
            .map_err(PollerError::collection("unifi.GetSiteDPI", url))?;
        metrics.clients_dpi = client
            .get_clients_dpi(&sites)
            .await
            .map_err(PollerError::collection("unifi.GetClientsDPI", url))?;
    }

    if config.save_ids && !filter.skip {
        // The window runs from one interval ahead back to now; the
        // controller accepts it and the backend de-duplicates.
        let now = Utc::now();
        metrics.ids = client
            .get_ids(&sites, now + TimeDelta::minutes(1), now)
            .await
            .map_err(PollerError::collection("unifi.GetIDS", url))?;
    }

    metrics.clients = client
        .get_clients(&sites)
        .await
        .map_err(PollerError::collection("unifi.GetClients", url))?;

    metrics.devices = Some(
        client
            .get_devices(&sites)
            .await
            .map_err(PollerError::collection("unifi.GetDevices", url))?,
    );

    Ok(augment_metrics(config, metrics))
}

/// IDS, anomalies, alarms and events for one controller, in that order.
pub(crate) async fn collect_events(
    controller: &Controller,
    filter: &Filter,
) -> Result<Events, PollerError> {
    let config = controller.config();
    let url = controller.url();
    let client = controller.ensure_session().await?;
    let sites = controller.filtered_sites(&client).await?;

    let window = TimeDelta::from_std(filter.dur.unwrap_or(DEFAULT_EVENT_WINDOW))
        .unwrap_or_else(|_| TimeDelta::minutes(1));
    let end = Utc::now();
    let start = end - window;
    let (hash, drop) = (config.hash_pii, config.drop_pii);
    let mut events = Events::default();

    if config.save_ids && !filter.skip {
        debug!("Collecting controller IDS data: {url}");
        let ids = client
            .get_ids(&sites, start, end)
            .await
            .map_err(PollerError::collection("unifi.GetIDS", url))?;
        events.logs.extend(ids.into_iter().map(LogEntry::Ids));
    }

    if config.save_anomalies {
        debug!("Collecting controller anomalies: {url}");
        let anomalies = client
            .get_anomalies(&sites, start, end)
            .await
            .map_err(PollerError::collection("unifi.GetAnomalies", url))?;
        events.logs.extend(anomalies.into_iter().map(LogEntry::Anomaly));
    }

    if config.save_alarms {
        debug!("Collecting controller alarms: {url}");
        let alarms = client
            .get_alarms(&sites)
            .await
            .map_err(PollerError::collection("unifi.GetAlarms", url))?;
        events.logs.extend(
            alarms
                .into_iter()
                .map(|a| LogEntry::Alarm(redact_event(a, hash, drop))),
        );
    }

    if config.save_events {
        debug!("Collecting controller site events: {url}");
        let site_events = client
            .get_events(&sites, start, end)
            .await
            .map_err(PollerError::collection("unifi.GetEvents", url))?;
        events.logs.extend(
            site_events
                .into_iter()
                .map(|e| LogEntry::Event(redact_event(e, hash, drop))),
        );
    }

    Ok(events)
}

/// Raw controller JSON: one array entry per site for devices and
/// clients, the body itself for `other`.
pub(crate) async fn raw_metrics(
    controller: &Controller,
    kind: RawKind,
    path: &str,
) -> Result<String, PollerError> {
    let url = controller.url();
    let client = controller.ensure_session().await?;

    if kind == RawKind::Other {
        return client
            .get_json(path)
            .await
            .map_err(PollerError::collection("unifi.GetJSON", url));
    }

    if let Err(err) = controller.check_sites(&client).await {
        warn!("checking sites on {url}: {err}");
    }
    let sites: Vec<Site> = controller.filtered_sites(&client).await?;

    let mut bodies = Vec::with_capacity(sites.len());
    for site in &sites {
        let site_path = format!("/api/s/{}/{}", site.name, kind.site_path());
        bodies.push(
            client
                .get_json(&site_path)
                .await
                .map_err(PollerError::collection("unifi.GetJSON", url))?,
        );
    }

    Ok(format!("[{}]", bodies.join(",")))
}
