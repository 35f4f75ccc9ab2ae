// Batch assembly
//
// Turns one metrics bundle and its event stream into a report holding
// every point for the tick.

use chrono::Utc;

use unpoller_core::{Events, LogEntry, Metrics};

use crate::clients::{DpiTotals, batch_client, batch_client_dpi};
use crate::config::InfluxConfig;
use crate::events::{batch_alarm, batch_anomaly, batch_event, batch_ids};
use crate::report::Report;
use crate::site::{batch_site, batch_site_dpi};
use crate::uap::batch_uap;
use crate::udm::batch_udm;
use crate::usg::batch_usg;
use crate::usw::batch_usw;

pub fn build_report(config: &InfluxConfig, metrics: &Metrics, events: &Events) -> Report {
    let mut r = Report::new(metrics);
    let now = Utc::now();
    let max_age = config.max_event_age();

    for site in &metrics.sites {
        batch_site(&mut r, site);
    }
    for table in &metrics.sites_dpi {
        batch_site_dpi(&mut r, table);
    }
    for client in &metrics.clients {
        batch_client(&mut r, client);
    }
    for ids in &metrics.ids {
        batch_ids(&mut r, ids, now, max_age);
    }

    if let Some(devices) = &metrics.devices {
        for d in &devices.uaps {
            batch_uap(&mut r, d, config.dead_ports);
        }
        for d in &devices.usgs {
            batch_usg(&mut r, d);
        }
        for d in &devices.usws {
            batch_usw(&mut r, d, config.dead_ports);
        }
        for d in &devices.udms {
            batch_udm(&mut r, d, config.dead_ports);
        }
    }

    for entry in &events.logs {
        match entry {
            LogEntry::Event(e) => batch_event(&mut r, e, now, max_age),
            LogEntry::Ids(e) => batch_ids(&mut r, e, now, max_age),
            LogEntry::Alarm(e) => batch_alarm(&mut r, e, now, max_age),
            LogEntry::Anomaly(a) => batch_anomaly(&mut r, a, now, max_age),
        }
    }

    let mut totals = DpiTotals::default();
    for table in &metrics.clients_dpi {
        batch_client_dpi(&mut r, table, &mut totals);
    }
    totals.report(&mut r, config.dpi_app_totals);

    r
}
