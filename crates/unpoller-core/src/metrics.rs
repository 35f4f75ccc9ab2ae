// ── Collected bundles ──
//
// The per-tick snapshot handed from inputs to outputs, the event stream,
// and the `Collected` wrapper that lets partial data travel with an error.

use chrono::{DateTime, Utc};
use serde::Serialize;

use unpoller_api::{Alarm, Anomaly, Client, Devices, DpiTable, Event, Ids, Site};

use crate::error::PollerError;

/// One polling snapshot across every matching controller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    pub ts: DateTime<Utc>,
    pub sites: Vec<Site>,
    pub sites_dpi: Vec<DpiTable>,
    pub clients: Vec<Client>,
    pub clients_dpi: Vec<DpiTable>,
    pub ids: Vec<Ids>,
    /// Always `Some` once a controller's data has been augmented.
    pub devices: Option<Devices>,
}

/// Merge two bundles. Sequences concatenate in argument order; `None` is
/// the identity on either side. Devices are allocated only when `m` has some.
pub fn append_metrics(existing: Option<Metrics>, m: Option<Metrics>) -> Option<Metrics> {
    let Some(mut existing) = existing else {
        return m;
    };
    let Some(m) = m else {
        return Some(existing);
    };

    existing.sites.extend(m.sites);
    existing.sites_dpi.extend(m.sites_dpi);
    existing.clients.extend(m.clients);
    existing.clients_dpi.extend(m.clients_dpi);
    existing.ids.extend(m.ids);

    if let Some(devices) = m.devices {
        existing
            .devices
            .get_or_insert_with(Devices::default)
            .extend(devices);
    }

    Some(existing)
}

/// One record from the controller's log-like endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Event(Event),
    Ids(Ids),
    Alarm(Alarm),
    Anomaly(Anomaly),
}

/// Events, IDS hits, alarms and anomalies, in collection order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Events {
    pub logs: Vec<LogEntry>,
}

impl Events {
    pub fn append(&mut self, other: Events) {
        self.logs.extend(other.logs);
    }
}

/// Data gathered from the sources that answered, plus the joined error
/// from the ones that did not.
#[derive(Debug)]
pub struct Collected<T> {
    pub data: T,
    pub error: Option<PollerError>,
}

impl<T> Collected<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn failed(data: T, error: PollerError) -> Self {
        Self {
            data,
            error: Some(error),
        }
    }

    /// Discard partial data if anything failed.
    pub fn into_result(self) -> Result<T, PollerError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}
