use chrono::{DateTime, TimeZone, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::flex::{FlexBool, FlexInt, nullable};

/// A controller event, IDS/IPS hit, or alarm.
///
/// The three endpoints return overlapping shapes, so one struct models
/// them all; fields an endpoint never sends stay at their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    pub archived: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub time: i64,
    #[serde(deserialize_with = "nullable")]
    pub timestamp: i64,
    #[serde(deserialize_with = "lenient_datetime")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable")]
    pub key: String,
    #[serde(deserialize_with = "nullable")]
    pub msg: String,
    #[serde(deserialize_with = "nullable")]
    pub subsystem: String,
    #[serde(deserialize_with = "nullable")]
    pub site_id: String,
    pub is_admin: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub admin: String,
    #[serde(deserialize_with = "nullable")]
    pub user: String,
    #[serde(deserialize_with = "nullable")]
    pub guest: String,
    #[serde(deserialize_with = "nullable")]
    pub host: String,
    #[serde(deserialize_with = "nullable")]
    pub hostname: String,
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    #[serde(deserialize_with = "nullable")]
    pub network: String,
    #[serde(deserialize_with = "nullable")]
    pub ssid: String,

    // ── Devices ─────────────────────────────────────────────────────
    #[serde(deserialize_with = "nullable")]
    pub ap: String,
    #[serde(deserialize_with = "nullable")]
    pub ap_name: String,
    #[serde(deserialize_with = "nullable")]
    pub ap_from: String,
    #[serde(deserialize_with = "nullable")]
    pub ap_to: String,
    #[serde(deserialize_with = "nullable")]
    pub gw: String,
    #[serde(deserialize_with = "nullable")]
    pub gw_name: String,
    #[serde(deserialize_with = "nullable")]
    pub sw: String,
    #[serde(deserialize_with = "nullable")]
    pub sw_name: String,
    #[serde(deserialize_with = "nullable")]
    pub radio: String,
    #[serde(deserialize_with = "nullable")]
    pub radio_from: String,
    #[serde(deserialize_with = "nullable")]
    pub radio_to: String,
    pub channel: FlexInt,
    pub channel_from: FlexInt,
    pub channel_to: FlexInt,
    pub bytes: FlexInt,
    pub duration: FlexInt,

    // ── Flow ────────────────────────────────────────────────────────
    #[serde(deserialize_with = "nullable")]
    pub event_type: String,
    #[serde(deserialize_with = "nullable")]
    pub app_proto: String,
    #[serde(deserialize_with = "nullable")]
    pub proto: String,
    #[serde(deserialize_with = "nullable")]
    pub catname: String,
    #[serde(deserialize_with = "nullable")]
    pub in_iface: String,
    #[serde(deserialize_with = "nullable")]
    pub src_ip: String,
    #[serde(deserialize_with = "nullable")]
    pub src_mac: String,
    pub src_port: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub dest_ip: String,
    #[serde(deserialize_with = "nullable")]
    pub dst_mac: String,
    pub dest_port: FlexInt,
    pub flow_id: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub usgip: String,
    #[serde(deserialize_with = "nullable")]
    pub unique_alertid: String,
    #[serde(deserialize_with = "nullable")]
    pub inner_alert_action: String,
    #[serde(deserialize_with = "nullable")]
    pub inner_alert_category: String,
    #[serde(deserialize_with = "nullable")]
    pub inner_alert_signature: String,
    pub inner_alert_gid: FlexInt,
    pub inner_alert_rev: FlexInt,
    pub inner_alert_severity: FlexInt,
    pub inner_alert_signature_id: FlexInt,
    #[serde(rename = "srcipGeo")]
    pub src_ip_geo: IpGeo,
    #[serde(rename = "dstipGeo")]
    pub dst_ip_geo: IpGeo,
    #[serde(rename = "usgipGeo")]
    pub usg_ip_geo: IpGeo,

    /// Stamped after fetch.
    #[serde(deserialize_with = "nullable")]
    pub site_name: String,
    #[serde(deserialize_with = "nullable")]
    pub source_name: String,
}

/// IDS/IPS entries from `stat/ips/event`.
pub type Ids = Event;
/// Alarms from `list/alarm`.
pub type Alarm = Event;

impl Event {
    /// The record time: `datetime` when present, else `time` in milliseconds.
    pub fn when(&self) -> DateTime<Utc> {
        self.datetime
            .or_else(|| Utc.timestamp_millis_opt(self.time).single())
            .unwrap_or_default()
    }
}

/// GeoIP annotation on an IDS hit. The controller sends `[]` when unknown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpGeo {
    pub asn: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub continent_code: String,
    pub country_code: String,
    pub country_name: String,
    pub organization: String,
}

impl<'de> Deserialize<'de> for IpGeo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct Fields {
            asn: FlexInt,
            #[serde(deserialize_with = "nullable")]
            latitude: f64,
            #[serde(deserialize_with = "nullable")]
            longitude: f64,
            #[serde(deserialize_with = "nullable")]
            city: String,
            #[serde(deserialize_with = "nullable")]
            continent_code: String,
            #[serde(deserialize_with = "nullable")]
            country_code: String,
            #[serde(deserialize_with = "nullable")]
            country_name: String,
            #[serde(deserialize_with = "nullable")]
            organization: String,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Geo(Fields),
            Other(serde_json::Value),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Geo(f) => IpGeo {
                asn: f.asn.int64(),
                latitude: f.latitude,
                longitude: f.longitude,
                city: f.city,
                continent_code: f.continent_code,
                country_code: f.country_code,
                country_name: f.country_name,
                organization: f.organization,
            },
            Shape::Other(_) => IpGeo::default(),
        })
    }
}

/// An anomaly occurrence, flattened from `stat/anomalies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Anomaly {
    #[serde(deserialize_with = "nullable")]
    pub datetime: DateTime<Utc>,
    #[serde(deserialize_with = "nullable")]
    pub source_name: String,
    #[serde(deserialize_with = "nullable")]
    pub site_name: String,
    #[serde(deserialize_with = "nullable")]
    pub anomaly: String,
    #[serde(deserialize_with = "nullable")]
    pub device_mac: String,
}

fn lenient_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc)))
}
