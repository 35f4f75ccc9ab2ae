use serde::{Deserialize, Serialize};

use crate::flex::{FlexBool, FlexInt, nullable};

/// A site from `/api/stat/sites`, including its health subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub desc: String,
    #[serde(deserialize_with = "nullable")]
    pub attr_hidden_id: String,
    pub attr_no_delete: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub health: Vec<Health>,
    pub num_new_alarms: FlexInt,
    /// `"<desc> (<name>)"`, stamped after fetch.
    #[serde(deserialize_with = "nullable")]
    pub site_name: String,
    #[serde(deserialize_with = "nullable")]
    pub source_name: String,
}

/// One health subsystem (`www`, `wlan`, `wan`, `lan`, `vpn`) of a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    #[serde(deserialize_with = "nullable")]
    pub subsystem: String,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    pub num_user: FlexInt,
    pub num_guest: FlexInt,
    pub num_iot: FlexInt,
    #[serde(rename = "tx_bytes-r")]
    pub tx_bytes_r: FlexInt,
    #[serde(rename = "rx_bytes-r")]
    pub rx_bytes_r: FlexInt,
    pub num_ap: FlexInt,
    pub num_adopted: FlexInt,
    pub num_disabled: FlexInt,
    pub num_disconnected: FlexInt,
    pub num_pending: FlexInt,
    pub num_gw: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub wan_ip: String,
    #[serde(deserialize_with = "nullable")]
    pub gateways: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub netmask: String,
    #[serde(deserialize_with = "nullable")]
    pub nameservers: Vec<String>,
    pub num_sta: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub gw_mac: String,
    #[serde(deserialize_with = "nullable")]
    pub gw_name: String,
    #[serde(rename = "gw_system-stats", deserialize_with = "nullable")]
    pub gw_system_stats: GatewayStats,
    #[serde(deserialize_with = "nullable")]
    pub gw_version: String,
    pub latency: FlexInt,
    pub uptime: FlexInt,
    pub drops: FlexInt,
    pub xput_up: FlexInt,
    pub xput_down: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub speedtest_status: String,
    pub speedtest_lastrun: FlexInt,
    pub speedtest_ping: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub lan_ip: String,
    pub num_sw: FlexInt,
    pub remote_user_enabled: FlexBool,
    pub remote_user_num_active: FlexInt,
    pub remote_user_num_inactive: FlexInt,
    pub remote_user_rx_bytes: FlexInt,
    pub remote_user_tx_bytes: FlexInt,
    pub remote_user_rx_packets: FlexInt,
    pub remote_user_tx_packets: FlexInt,
    pub site_to_site_enabled: FlexBool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayStats {
    pub cpu: FlexInt,
    pub mem: FlexInt,
    pub uptime: FlexInt,
}
