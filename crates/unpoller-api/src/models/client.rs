use serde::{Deserialize, Serialize};

use crate::flex::{FlexBool, FlexInt, nullable};

/// A connected station from `stat/sta`.
///
/// `ap_name`, `sw_name`, `gw_name` and `radio_description` are filled in
/// by the collector from the device list of the same poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub hostname: String,
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    #[serde(deserialize_with = "nullable")]
    pub fixed_ip: String,
    pub use_fixedip: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub oui: String,
    #[serde(deserialize_with = "nullable")]
    pub note: String,
    #[serde(deserialize_with = "nullable")]
    pub network: String,
    #[serde(deserialize_with = "nullable")]
    pub network_id: String,
    #[serde(deserialize_with = "nullable")]
    pub site_id: String,
    #[serde(deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(deserialize_with = "nullable")]
    pub usergroup_id: String,

    // ── Classification ──────────────────────────────────────────────
    pub dev_cat: FlexInt,
    pub dev_family: FlexInt,
    pub dev_id: FlexInt,
    pub dev_vendor: FlexInt,
    pub os_class: FlexInt,
    pub os_name: FlexInt,
    pub is_guest: FlexBool,
    pub is_wired: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub blocked: bool,
    pub noted: FlexBool,
    pub vlan: FlexInt,

    // ── Uplink ──────────────────────────────────────────────────────
    #[serde(deserialize_with = "nullable")]
    pub ap_mac: String,
    #[serde(deserialize_with = "nullable")]
    pub gw_mac: String,
    #[serde(deserialize_with = "nullable")]
    pub sw_mac: String,
    pub sw_port: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub sw_depth: i64,
    #[serde(deserialize_with = "nullable")]
    pub bssid: String,
    #[serde(deserialize_with = "nullable")]
    pub essid: String,
    pub channel: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub radio: String,
    #[serde(deserialize_with = "nullable")]
    pub radio_name: String,
    #[serde(deserialize_with = "nullable")]
    pub radio_proto: String,
    pub is_11r: FlexBool,
    pub powersave_enabled: FlexBool,
    pub qos_policy_applied: FlexBool,

    // ── Timing ──────────────────────────────────────────────────────
    #[serde(deserialize_with = "nullable")]
    pub anomalies: i64,
    #[serde(deserialize_with = "nullable")]
    pub assoc_time: i64,
    #[serde(deserialize_with = "nullable")]
    pub latest_assoc_time: i64,
    #[serde(deserialize_with = "nullable")]
    pub first_seen: i64,
    #[serde(deserialize_with = "nullable")]
    pub last_seen: i64,
    #[serde(deserialize_with = "nullable")]
    pub idle_time: i64,
    #[serde(deserialize_with = "nullable")]
    pub uptime: i64,
    #[serde(deserialize_with = "nullable")]
    pub dpi_stats_last_updated: i64,

    // ── Radio quality ───────────────────────────────────────────────
    #[serde(deserialize_with = "nullable")]
    pub ccq: i64,
    #[serde(deserialize_with = "nullable")]
    pub noise: i64,
    #[serde(deserialize_with = "nullable")]
    pub rssi: i64,
    #[serde(deserialize_with = "nullable")]
    pub signal: i64,
    pub satisfaction: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub roam_count: i64,
    #[serde(deserialize_with = "nullable")]
    pub tx_power: i64,
    #[serde(deserialize_with = "nullable")]
    pub tx_rate: i64,
    #[serde(deserialize_with = "nullable")]
    pub rx_rate: i64,
    #[serde(deserialize_with = "nullable")]
    pub tx_retries: i64,
    #[serde(deserialize_with = "nullable")]
    pub wifi_tx_attempts: i64,

    // ── Counters ────────────────────────────────────────────────────
    #[serde(rename = "bytes-r", deserialize_with = "nullable")]
    pub bytes_r: f64,
    #[serde(deserialize_with = "nullable")]
    pub rx_bytes: i64,
    #[serde(rename = "rx_bytes-r", deserialize_with = "nullable")]
    pub rx_bytes_r: f64,
    #[serde(deserialize_with = "nullable")]
    pub rx_packets: i64,
    #[serde(deserialize_with = "nullable")]
    pub tx_bytes: i64,
    #[serde(rename = "tx_bytes-r", deserialize_with = "nullable")]
    pub tx_bytes_r: f64,
    #[serde(deserialize_with = "nullable")]
    pub tx_packets: i64,
    #[serde(rename = "wired-rx_bytes", deserialize_with = "nullable")]
    pub wired_rx_bytes: i64,
    #[serde(rename = "wired-rx_bytes-r", deserialize_with = "nullable")]
    pub wired_rx_bytes_r: f64,
    #[serde(rename = "wired-rx_packets", deserialize_with = "nullable")]
    pub wired_rx_packets: i64,
    #[serde(rename = "wired-tx_bytes", deserialize_with = "nullable")]
    pub wired_tx_bytes: i64,
    #[serde(rename = "wired-tx_bytes-r", deserialize_with = "nullable")]
    pub wired_tx_bytes_r: f64,
    #[serde(rename = "wired-tx_packets", deserialize_with = "nullable")]
    pub wired_tx_packets: i64,

    // ── Stamped after fetch ─────────────────────────────────────────
    #[serde(deserialize_with = "nullable")]
    pub site_name: String,
    #[serde(deserialize_with = "nullable")]
    pub source_name: String,
    #[serde(deserialize_with = "nullable")]
    pub ap_name: String,
    #[serde(deserialize_with = "nullable")]
    pub sw_name: String,
    #[serde(deserialize_with = "nullable")]
    pub gw_name: String,
    #[serde(deserialize_with = "nullable")]
    pub radio_description: String,
}
