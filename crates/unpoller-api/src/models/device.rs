use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::flex::{FlexBool, FlexInt, nullable};

// ── Shared ───────────────────────────────────────────────────────────

/// Fields every adopted device reports regardless of its role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCommon {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub model: String,
    #[serde(deserialize_with = "nullable")]
    pub serial: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub device_type: String,
    #[serde(deserialize_with = "nullable")]
    pub version: String,
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    #[serde(deserialize_with = "nullable")]
    pub site_id: String,
    pub adopted: FlexBool,
    pub locating: FlexBool,
    pub state: FlexInt,
    pub last_seen: FlexInt,
    pub uptime: FlexInt,
    pub upgradable: FlexBool,
    pub satisfaction: FlexInt,
    pub bytes: FlexInt,
    pub rx_bytes: FlexInt,
    pub tx_bytes: FlexInt,
    #[serde(rename = "bytes-r")]
    pub bytes_r: FlexInt,
    pub num_sta: FlexInt,
    #[serde(rename = "user-num_sta")]
    pub user_num_sta: FlexInt,
    #[serde(rename = "guest-num_sta")]
    pub guest_num_sta: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub sys_stats: SysStats,
    #[serde(rename = "system-stats", deserialize_with = "nullable")]
    pub system_stats: SystemStats,
    pub stat: DeviceStat,
    /// Stamped after fetch.
    #[serde(deserialize_with = "nullable")]
    pub site_name: String,
    #[serde(deserialize_with = "nullable")]
    pub source_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SysStats {
    pub loadavg_1: FlexInt,
    pub loadavg_5: FlexInt,
    pub loadavg_15: FlexInt,
    pub mem_buffer: FlexInt,
    pub mem_total: FlexInt,
    pub mem_used: FlexInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    pub cpu: FlexInt,
    pub mem: FlexInt,
    pub uptime: FlexInt,
}

/// The `stat` block of a device.
///
/// Older firmware sends a flat object; newer firmware nests the same
/// counters one level down under `ap`, `sw` or `gw`. Both shapes land in
/// one flat map. Non-numeric entries (`datetime`, `site_id`, ...) are dropped.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DeviceStat(BTreeMap<String, FlexInt>);

impl DeviceStat {
    /// The counter for `key`, or zero if absent.
    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).map_or(0.0, |v| v.val)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, key: &str, value: &serde_json::Value) {
        let flex = match value {
            serde_json::Value::Number(n) => n.as_f64().map(FlexInt::new),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(FlexInt::new),
            _ => None,
        };
        if let Some(flex) = flex {
            self.0.insert(key.to_owned(), flex);
        }
    }
}

impl<'de> Deserialize<'de> for DeviceStat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
        let mut stat = DeviceStat::default();
        for (key, value) in raw.unwrap_or_default() {
            match value {
                serde_json::Value::Object(nested) => {
                    for (inner_key, inner) in &nested {
                        stat.insert(inner_key, inner);
                    }
                }
                other => stat.insert(&key, &other),
            }
        }
        Ok(stat)
    }
}

// ── Wired tables ─────────────────────────────────────────────────────

/// One switch port from `port_table`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub port_idx: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    pub up: FlexBool,
    pub enable: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub media: String,
    #[serde(deserialize_with = "nullable")]
    pub poe_mode: String,
    pub port_poe: FlexBool,
    pub poe_enable: FlexBool,
    pub poe_current: FlexInt,
    pub poe_power: FlexInt,
    pub poe_voltage: FlexInt,
    pub flowctrl_rx: FlexBool,
    pub flowctrl_tx: FlexBool,
    pub full_duplex: FlexBool,
    pub speed: FlexInt,
    pub stp_pathcost: FlexInt,
    pub satisfaction: FlexInt,
    #[serde(rename = "bytes-r")]
    pub bytes_r: FlexInt,
    pub rx_broadcast: FlexInt,
    pub rx_bytes: FlexInt,
    #[serde(rename = "rx_bytes-r")]
    pub rx_bytes_r: FlexInt,
    pub rx_dropped: FlexInt,
    pub rx_errors: FlexInt,
    pub rx_multicast: FlexInt,
    pub rx_packets: FlexInt,
    pub tx_broadcast: FlexInt,
    pub tx_bytes: FlexInt,
    #[serde(rename = "tx_bytes-r")]
    pub tx_bytes_r: FlexInt,
    pub tx_dropped: FlexInt,
    pub tx_errors: FlexInt,
    pub tx_multicast: FlexInt,
    pub tx_packets: FlexInt,
    pub sfp_found: FlexBool,
    #[serde(deserialize_with = "nullable")]
    pub sfp_compliance: String,
    #[serde(deserialize_with = "nullable")]
    pub sfp_serial: String,
    #[serde(deserialize_with = "nullable")]
    pub sfp_vendor: String,
    #[serde(deserialize_with = "nullable")]
    pub sfp_part: String,
    pub sfp_current: FlexInt,
    pub sfp_voltage: FlexInt,
    pub sfp_temperature: FlexInt,
    pub sfp_txpower: FlexInt,
    pub sfp_rxpower: FlexInt,
}

/// A gateway WAN interface (`wan1`, `wan2`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wan {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub ifname: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub wan_type: String,
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    #[serde(deserialize_with = "nullable")]
    pub gateway: String,
    pub enable: FlexBool,
    pub up: FlexBool,
    pub is_uplink: FlexBool,
    pub full_duplex: FlexBool,
    pub speed: FlexInt,
    pub max_speed: FlexInt,
    #[serde(rename = "bytes-r")]
    pub bytes_r: FlexInt,
    pub rx_broadcast: FlexInt,
    pub rx_bytes: FlexInt,
    #[serde(rename = "rx_bytes-r")]
    pub rx_bytes_r: FlexInt,
    pub rx_dropped: FlexInt,
    pub rx_errors: FlexInt,
    pub rx_multicast: FlexInt,
    pub rx_packets: FlexInt,
    pub tx_broadcast: FlexInt,
    pub tx_bytes: FlexInt,
    #[serde(rename = "tx_bytes-r")]
    pub tx_bytes_r: FlexInt,
    pub tx_dropped: FlexInt,
    pub tx_errors: FlexInt,
    pub tx_multicast: FlexInt,
    pub tx_packets: FlexInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Uplink {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub uplink_type: String,
    #[serde(deserialize_with = "nullable")]
    pub uplink_mac: String,
    pub latency: FlexInt,
    pub speed: FlexInt,
    pub max_speed: FlexInt,
    pub uptime: FlexInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedtestStatus {
    pub latency: FlexInt,
    pub rundate: FlexInt,
    pub runtime: FlexInt,
    pub status_ping: FlexInt,
    pub xput_download: FlexInt,
    pub xput_upload: FlexInt,
}

/// One LAN from a gateway's `network_table`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkEntry {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub purpose: String,
    #[serde(deserialize_with = "nullable")]
    pub domain_name: String,
    #[serde(deserialize_with = "nullable")]
    pub ip: String,
    #[serde(deserialize_with = "nullable")]
    pub mac: String,
    pub up: FlexBool,
    pub enabled: FlexBool,
    pub is_guest: FlexBool,
    pub num_sta: FlexInt,
    pub rx_bytes: FlexInt,
    pub rx_packets: FlexInt,
    pub tx_bytes: FlexInt,
    pub tx_packets: FlexInt,
}

// ── Wireless tables ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioEntry {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub radio: String,
    pub channel: FlexInt,
    pub current_antenna_gain: FlexInt,
    pub ht: FlexInt,
    pub max_txpower: FlexInt,
    pub min_txpower: FlexInt,
    pub nss: FlexInt,
    pub radio_caps: FlexInt,
    pub tx_power: FlexInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioStats {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub radio: String,
    pub channel: FlexInt,
    pub ast_be_xmit: FlexInt,
    pub cu_total: FlexInt,
    pub cu_self_rx: FlexInt,
    pub cu_self_tx: FlexInt,
    pub gain: FlexInt,
    pub satisfaction: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub state: String,
    pub extchannel: FlexInt,
    pub tx_power: FlexInt,
    pub tx_packets: FlexInt,
    pub tx_retries: FlexInt,
    pub num_sta: FlexInt,
    #[serde(rename = "user-num_sta")]
    pub user_num_sta: FlexInt,
    #[serde(rename = "guest-num_sta")]
    pub guest_num_sta: FlexInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpStats {
    pub goodbytes: FlexInt,
    pub lat_avg: FlexInt,
    pub lat_max: FlexInt,
    pub lat_min: FlexInt,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxLatency {
    pub avg: FlexInt,
    pub max: FlexInt,
    pub min: FlexInt,
    pub total: FlexInt,
    pub total_count: FlexInt,
}

/// One virtual access point (SSID on a radio) from `vap_table`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vap {
    #[serde(deserialize_with = "nullable")]
    pub ap_mac: String,
    #[serde(deserialize_with = "nullable")]
    pub bssid: String,
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub radio: String,
    #[serde(deserialize_with = "nullable")]
    pub radio_name: String,
    #[serde(deserialize_with = "nullable")]
    pub essid: String,
    #[serde(deserialize_with = "nullable")]
    pub site_id: String,
    #[serde(deserialize_with = "nullable")]
    pub usage: String,
    #[serde(deserialize_with = "nullable")]
    pub state: String,
    pub is_guest: FlexBool,
    pub up: FlexBool,
    pub channel: FlexInt,
    pub ccq: FlexInt,
    pub mac_filter_rejections: FlexInt,
    pub num_satisfaction_sta: FlexInt,
    pub avg_client_signal: FlexInt,
    pub satisfaction: FlexInt,
    pub satisfaction_now: FlexInt,
    pub dns_avg_latency: FlexInt,
    pub num_sta: FlexInt,
    pub rx_bytes: FlexInt,
    pub rx_crypts: FlexInt,
    pub rx_dropped: FlexInt,
    pub rx_errors: FlexInt,
    pub rx_frags: FlexInt,
    pub rx_nwids: FlexInt,
    pub rx_packets: FlexInt,
    pub tx_bytes: FlexInt,
    pub tx_dropped: FlexInt,
    pub tx_errors: FlexInt,
    pub tx_packets: FlexInt,
    pub tx_power: FlexInt,
    pub tx_retries: FlexInt,
    pub tx_combined_retries: FlexInt,
    pub tx_data_mpdu_bytes: FlexInt,
    pub tx_rts_retries: FlexInt,
    pub tx_success: FlexInt,
    pub tx_total: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub rx_tcp_stats: TcpStats,
    #[serde(deserialize_with = "nullable")]
    pub tx_tcp_stats: TcpStats,
    #[serde(deserialize_with = "nullable")]
    pub wifi_tx_latency_mov: TxLatency,
}

// ── Device roles ─────────────────────────────────────────────────────

/// Wireless access point (`type: "uap"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Uap {
    #[serde(flatten)]
    pub common: DeviceCommon,
    #[serde(deserialize_with = "nullable")]
    pub radio_table: Vec<RadioEntry>,
    #[serde(deserialize_with = "nullable")]
    pub radio_table_stats: Vec<RadioStats>,
    #[serde(deserialize_with = "nullable")]
    pub vap_table: Vec<Vap>,
    #[serde(deserialize_with = "nullable")]
    pub port_table: Vec<Port>,
    #[serde(rename = "bytes-d")]
    pub bytes_d: FlexInt,
    #[serde(rename = "tx_bytes-d")]
    pub tx_bytes_d: FlexInt,
    #[serde(rename = "rx_bytes-d")]
    pub rx_bytes_d: FlexInt,
    pub has_temperature: FlexBool,
    pub general_temperature: FlexInt,
}

/// Security gateway (`type: "ugw"` or `"usg"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Usg {
    #[serde(flatten)]
    pub common: DeviceCommon,
    #[serde(deserialize_with = "nullable")]
    pub wan1: Wan,
    #[serde(deserialize_with = "nullable")]
    pub wan2: Wan,
    #[serde(deserialize_with = "nullable")]
    pub uplink: Uplink,
    #[serde(rename = "speedtest-status", deserialize_with = "nullable")]
    pub speedtest_status: SpeedtestStatus,
    #[serde(deserialize_with = "nullable")]
    pub network_table: Vec<NetworkEntry>,
    #[serde(deserialize_with = "nullable")]
    pub port_table: Vec<Port>,
    #[serde(deserialize_with = "nullable")]
    pub license_state: String,
    pub num_desktop: FlexInt,
    pub num_handheld: FlexInt,
    pub num_mobile: FlexInt,
    pub has_temperature: FlexBool,
    pub general_temperature: FlexInt,
}

/// Switch (`type: "usw"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Usw {
    #[serde(flatten)]
    pub common: DeviceCommon,
    #[serde(deserialize_with = "nullable")]
    pub port_table: Vec<Port>,
    #[serde(deserialize_with = "nullable")]
    pub uplink: Uplink,
    pub has_fan: FlexBool,
    pub fan_level: FlexInt,
    pub has_temperature: FlexBool,
    pub general_temperature: FlexInt,
    pub total_max_power: FlexInt,
}

/// Dream Machine (`type: "udm"`): a gateway, a switch, and usually an AP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Udm {
    #[serde(flatten)]
    pub common: DeviceCommon,
    #[serde(deserialize_with = "nullable")]
    pub wan1: Wan,
    #[serde(deserialize_with = "nullable")]
    pub wan2: Wan,
    #[serde(deserialize_with = "nullable")]
    pub uplink: Uplink,
    #[serde(rename = "speedtest-status", deserialize_with = "nullable")]
    pub speedtest_status: SpeedtestStatus,
    #[serde(deserialize_with = "nullable")]
    pub network_table: Vec<NetworkEntry>,
    #[serde(deserialize_with = "nullable")]
    pub port_table: Vec<Port>,
    #[serde(deserialize_with = "nullable")]
    pub license_state: String,
    pub num_desktop: FlexInt,
    pub num_handheld: FlexInt,
    pub num_mobile: FlexInt,
    pub has_fan: FlexBool,
    pub fan_level: FlexInt,
    pub has_temperature: FlexBool,
    pub general_temperature: FlexInt,
    pub total_max_power: FlexInt,
    #[serde(deserialize_with = "nullable")]
    pub radio_table: Vec<RadioEntry>,
    #[serde(deserialize_with = "nullable")]
    pub radio_table_stats: Vec<RadioStats>,
    #[serde(deserialize_with = "nullable")]
    pub vap_table: Vec<Vap>,
}

/// Devices grouped by role, as returned by `get_devices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Devices {
    #[serde(deserialize_with = "nullable")]
    pub uaps: Vec<Uap>,
    #[serde(deserialize_with = "nullable")]
    pub usgs: Vec<Usg>,
    #[serde(deserialize_with = "nullable")]
    pub usws: Vec<Usw>,
    #[serde(deserialize_with = "nullable")]
    pub udms: Vec<Udm>,
}

impl Devices {
    pub fn len(&self) -> usize {
        self.uaps.len() + self.usgs.len() + self.usws.len() + self.udms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every device from `other`.
    pub fn extend(&mut self, other: Devices) {
        self.uaps.extend(other.uaps);
        self.usgs.extend(other.usgs);
        self.usws.extend(other.usws);
        self.udms.extend(other.udms);
    }

    /// Shared fields of every device, in role order.
    pub fn commons(&self) -> impl Iterator<Item = &DeviceCommon> {
        self.uaps
            .iter()
            .map(|d| &d.common)
            .chain(self.usgs.iter().map(|d| &d.common))
            .chain(self.usws.iter().map(|d| &d.common))
            .chain(self.udms.iter().map(|d| &d.common))
    }

    /// Every VAP across APs and Dream Machines.
    pub fn vaps(&self) -> impl Iterator<Item = (&DeviceCommon, &Vap)> {
        let uap = self
            .uaps
            .iter()
            .flat_map(|d| d.vap_table.iter().map(move |v| (&d.common, v)));
        let udm = self
            .udms
            .iter()
            .flat_map(|d| d.vap_table.iter().map(move |v| (&d.common, v)));
        uap.chain(udm)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn stat_accepts_flat_shape() {
        let uap: Uap = serde_json::from_str(
            r#"{"type":"uap","stat":{"user-rx_bytes":100,"tx_bytes":"7","datetime":"2020-01-01T00:00:00Z"}}"#,
        )
        .unwrap();
        assert_eq!(uap.common.stat.get("user-rx_bytes"), 100.0);
        assert_eq!(uap.common.stat.get("tx_bytes"), 7.0);
        assert_eq!(uap.common.stat.get("datetime"), 0.0);
    }

    #[test]
    fn stat_accepts_nested_shape() {
        let usw: Usw =
            serde_json::from_str(r#"{"type":"usw","stat":{"sw":{"rx_packets":12,"bytes":9}}}"#)
                .unwrap();
        assert_eq!(usw.common.stat.get("rx_packets"), 12.0);
        assert_eq!(usw.common.stat.get("bytes"), 9.0);
    }

    #[test]
    fn common_fields_flatten_into_roles() {
        let usg: Usg = serde_json::from_str(
            r#"{"_id":"x","mac":"aa:bb","name":"gw","type":"ugw","uptime":"42",
                "wan1":{"up":true,"rx_bytes":5},"system-stats":{"cpu":"12.5"}}"#,
        )
        .unwrap();
        assert_eq!(usg.common.name, "gw");
        assert_eq!(usg.common.uptime.val, 42.0);
        assert!(usg.wan1.up.val);
        assert_eq!(usg.common.system_stats.cpu.val, 12.5);
    }

    #[test]
    fn devices_len_counts_every_role() {
        let mut devs = Devices::default();
        assert!(devs.is_empty());
        devs.uaps.push(Uap::default());
        devs.extend(Devices {
            usws: vec![Usw::default(), Usw::default()],
            ..Devices::default()
        });
        assert_eq!(devs.len(), 3);
        assert_eq!(devs.commons().count(), 3);
    }
}
