// Event, IDS, alarm and anomaly endpoints

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{Alarm, Anomaly, Event, Ids, Site};

const EVENT_LIMIT: u32 = 50_000;

/// Raw `stat/anomalies` entry; one per anomaly kind and device.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnomalyEntry {
    anomaly: String,
    mac: String,
    timestamps: Vec<i64>,
}

impl ControllerClient {
    /// IDS/IPS hits between `start` and `end`.
    ///
    /// `POST /api/s/{site}/stat/ips/event`
    pub async fn get_ids(
        &self,
        sites: &[Site],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ids>, Error> {
        let body = json!({
            "start": format!("{}000", start.timestamp()),
            "end": format!("{}000", end.timestamp()),
            "_limit": EVENT_LIMIT,
        });

        let mut out = Vec::new();
        for site in sites {
            debug!(site = %site.site_name, "polling IDS");
            let url = self.site_url(&site.name, "stat/ips/event")?;
            let mut ids: Vec<Ids> = self.post(url, &body).await?;
            self.stamp_events(&mut ids, site);
            out.extend(ids);
        }
        Ok(out)
    }

    /// Controller events between `start` and `end`, newest first.
    ///
    /// `POST /api/s/{site}/stat/event`
    pub async fn get_events(
        &self,
        sites: &[Site],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, Error> {
        let body = json!({
            "start": start.timestamp_millis(),
            "end": end.timestamp_millis(),
            "_limit": EVENT_LIMIT,
            "within": 1,
            "_sort": "-time",
        });

        let mut out = Vec::new();
        for site in sites {
            debug!(site = %site.site_name, "polling events");
            let url = self.site_url(&site.name, "stat/event")?;
            let mut events: Vec<Event> = self.post(url, &body).await?;
            self.stamp_events(&mut events, site);
            out.extend(events);
        }
        Ok(out)
    }

    /// Site alarms, oldest first.
    ///
    /// `GET /api/s/{site}/list/alarm`
    pub async fn get_alarms(&self, sites: &[Site]) -> Result<Vec<Alarm>, Error> {
        let mut out = Vec::new();
        for site in sites {
            debug!(site = %site.site_name, "polling alarms");
            let url = self.site_url(&site.name, "list/alarm")?;
            let mut alarms: Vec<Alarm> = self.get(url).await?;
            self.stamp_events(&mut alarms, site);
            alarms.sort_by_key(Event::when);
            out.extend(alarms);
        }
        Ok(out)
    }

    /// Anomalies between `start` and `end`, one record per occurrence,
    /// oldest first.
    ///
    /// `GET /api/s/{site}/stat/anomalies?scale=hourly&end=..&start=..`
    pub async fn get_anomalies(
        &self,
        sites: &[Site],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Anomaly>, Error> {
        let query = format!(
            "stat/anomalies?scale=hourly&end={}&start={}",
            end.timestamp_millis(),
            start.timestamp_millis()
        );

        let mut out = Vec::new();
        for site in sites {
            debug!(site = %site.site_name, "polling anomalies");
            let url = self.site_url(&site.name, &query)?;
            let entries: Vec<AnomalyEntry> = self.get(url).await?;

            let mut anomalies: Vec<Anomaly> = entries
                .iter()
                .flat_map(|entry| {
                    entry.timestamps.iter().map(|ts| Anomaly {
                        datetime: Utc.timestamp_opt(ts / 1000, 0).single().unwrap_or_default(),
                        source_name: self.source().to_owned(),
                        site_name: site.site_name.clone(),
                        anomaly: entry.anomaly.clone(),
                        device_mac: entry.mac.clone(),
                    })
                })
                .collect();
            anomalies.sort_by_key(|a| a.datetime);
            out.extend(anomalies);
        }
        Ok(out)
    }

    fn stamp_events(&self, events: &mut [Event], site: &Site) {
        for event in events {
            event.site_name.clone_from(&site.site_name);
            event.source_name = self.source().to_owned();
        }
    }
}
