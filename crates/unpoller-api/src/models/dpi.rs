use serde::{Deserialize, Serialize};

use crate::flex::{FlexInt, nullable};

/// Deep-packet-inspection counters for one site or one client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DpiTable {
    #[serde(deserialize_with = "nullable")]
    pub by_app: Vec<DpiApp>,
    #[serde(deserialize_with = "nullable")]
    pub by_cat: Vec<DpiApp>,
    /// Client MAC; empty for site tables.
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    /// Client display name, resolved by the collector.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub site_name: String,
    #[serde(deserialize_with = "nullable")]
    pub source_name: String,
}

/// Traffic for one application (or category, in `by_cat`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DpiApp {
    pub app: FlexInt,
    pub cat: FlexInt,
    pub rx_bytes: FlexInt,
    pub rx_packets: FlexInt,
    pub tx_bytes: FlexInt,
    pub tx_packets: FlexInt,
}
