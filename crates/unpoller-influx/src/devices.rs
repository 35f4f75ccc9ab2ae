// Shared device record builders
//
// Tags and field groups every device role reuses, plus the port, radio,
// VAP, WAN and network tables that hang off several roles.

use unpoller_api::models::{NetworkEntry, Port, RadioEntry, RadioStats, SpeedtestStatus, Uplink, Vap, Wan};
use unpoller_api::{DeviceCommon, DeviceStat};

use crate::point::{FieldValue, Fields, Tags, fields, flag, tags};
use crate::report::Report;

/// Counters an access point reports under `stat`.
pub(crate) const UAP_STATS: &[&str] = &[
    "user-rx_packets", "guest-rx_packets", "rx_packets",
    "user-rx_bytes", "guest-rx_bytes", "rx_bytes",
    "user-rx_errors", "guest-rx_errors", "rx_errors",
    "user-rx_dropped", "guest-rx_dropped", "rx_dropped",
    "user-rx_crypts", "guest-rx_crypts", "rx_crypts",
    "user-rx_frags", "guest-rx_frags", "rx_frags",
    "user-tx_packets", "guest-tx_packets", "tx_packets",
    "user-tx_bytes", "guest-tx_bytes", "tx_bytes",
    "user-tx_errors", "guest-tx_errors", "tx_errors",
    "user-tx_dropped", "guest-tx_dropped", "tx_dropped",
    "user-tx_retries", "guest-tx_retries",
];

/// Counters a switch reports under `stat`.
pub(crate) const USW_STATS: &[&str] = &[
    "bytes", "rx_bytes", "rx_crypts", "rx_dropped", "rx_errors", "rx_frags",
    "rx_packets", "tx_bytes", "tx_dropped", "tx_errors", "tx_packets", "tx_retries",
];

/// Gateway LAN counters; recorded without a prefix.
pub(crate) const USG_STATS: &[&str] = &[
    "lan-rx_bytes", "lan-rx_packets", "lan-tx_bytes", "lan-tx_packets", "lan-rx_dropped",
];

/// Devices that are unadopted or blinking their locate LED are not recorded.
pub(crate) fn skip(d: &DeviceCommon) -> bool {
    !d.adopted.val || d.locating.val
}

pub(crate) fn device_tags(d: &DeviceCommon) -> Tags {
    tags! {
        "mac" => d.mac,
        "site_name" => d.site_name,
        "source" => d.source_name,
        "name" => d.name,
        "version" => d.version,
        "model" => d.model,
        "serial" => d.serial,
        "type" => d.device_type,
    }
}

/// Fields shared by every role's main record.
pub(crate) fn common_fields(d: &DeviceCommon) -> Fields {
    fields! {
        "ip" => &d.ip,
        "bytes" => &d.bytes,
        "last_seen" => &d.last_seen,
        "rx_bytes" => &d.rx_bytes,
        "tx_bytes" => &d.tx_bytes,
        "uptime" => &d.uptime,
        "state" => &d.state,
        "user-num_sta" => &d.user_num_sta,
        "guest-num_sta" => &d.guest_num_sta,
        "upgradeable" => &d.upgradable,
    }
}

pub(crate) fn sys_stats(d: &DeviceCommon) -> Fields {
    fields! {
        "loadavg_1" => &d.sys_stats.loadavg_1,
        "loadavg_5" => &d.sys_stats.loadavg_5,
        "loadavg_15" => &d.sys_stats.loadavg_15,
        "mem_used" => &d.sys_stats.mem_used,
        "mem_buffer" => &d.sys_stats.mem_buffer,
        "mem_total" => &d.sys_stats.mem_total,
        "cpu" => &d.system_stats.cpu,
        "mem" => &d.system_stats.mem,
        "system_uptime" => &d.system_stats.uptime,
    }
}

/// Pick `keys` out of a device's `stat` block, each renamed `{prefix}{key}`.
pub(crate) fn stat_fields(stat: &DeviceStat, keys: &[&str], prefix: &str) -> Fields {
    keys.iter()
        .map(|key| (format!("{prefix}{key}"), FieldValue::Float(stat.get(key))))
        .collect()
}

pub(crate) fn gateway_fields(ss: &SpeedtestStatus, ul: &Uplink) -> Fields {
    fields! {
        "uplink_name" => &ul.name,
        "uplink_latency" => &ul.latency,
        "uplink_speed" => &ul.speed,
        "uplink_max_speed" => &ul.max_speed,
        "uplink_uptime" => &ul.uptime,
        "uplink_type" => &ul.uplink_type,
        "speedtest-status_latency" => &ss.latency,
        "speedtest-status_runtime" => &ss.runtime,
        "speedtest-status_rundate" => &ss.rundate,
        "speedtest-status_ping" => &ss.status_ping,
        "speedtest-status_xput_download" => &ss.xput_download,
        "speedtest-status_xput_upload" => &ss.xput_upload,
    }
}

/// Tags for a table row owned by a device, derived from the device tags.
fn child_tags(device: &Tags) -> Tags {
    let get = |key: &str| device.get(key).cloned().unwrap_or_default();
    tags! {
        "device_name" => get("name"),
        "site_name" => get("site_name"),
        "source" => get("source"),
    }
}

// ── Wired tables ─────────────────────────────────────────────────────

/// `usw_ports`: ports that are up and enabled, or all of them with `dead_ports`.
pub(crate) fn batch_port_table(r: &mut Report, device: &Tags, ports: &[Port], dead_ports: bool) {
    let device_name = device.get("name").map_or("", String::as_str);

    for p in ports {
        if !dead_ports && (!p.up.val || !p.enable.val) {
            continue;
        }

        let mut tags = child_tags(device);
        tags.extend(tags! {
            "type" => device.get("type").map_or("", String::as_str),
            "name" => p.name,
            "poe_mode" => p.poe_mode,
            "port_poe" => flag(&p.port_poe),
            "port_idx" => p.port_idx.txt,
            "port_id" => format!("{device_name} Port {}", p.port_idx.txt),
            "poe_enable" => flag(&p.poe_enable),
            "flowctrl_rx" => flag(&p.flowctrl_rx),
            "flowctrl_tx" => flag(&p.flowctrl_tx),
            "media" => p.media,
            "has_sfp" => flag(&p.sfp_found),
            "sfp_compliance" => p.sfp_compliance,
            "sfp_serial" => p.sfp_serial,
            "sfp_vendor" => p.sfp_vendor,
            "sfp_part" => p.sfp_part,
        });

        let mut fields = fields! {
            "dbytes_r" => &p.bytes_r,
            "rx_broadcast" => &p.rx_broadcast,
            "rx_bytes" => &p.rx_bytes,
            "rx_bytes-r" => &p.rx_bytes_r,
            "rx_dropped" => &p.rx_dropped,
            "rx_errors" => &p.rx_errors,
            "rx_multicast" => &p.rx_multicast,
            "rx_packets" => &p.rx_packets,
            "speed" => &p.speed,
            "stp_pathcost" => &p.stp_pathcost,
            "tx_broadcast" => &p.tx_broadcast,
            "tx_bytes" => &p.tx_bytes,
            "tx_bytes-r" => &p.tx_bytes_r,
            "tx_dropped" => &p.tx_dropped,
            "tx_errors" => &p.tx_errors,
            "tx_multicast" => &p.tx_multicast,
            "tx_packets" => &p.tx_packets,
        };

        if p.poe_enable.val && p.port_poe.val {
            fields.extend(fields! {
                "poe_current" => &p.poe_current,
                "poe_power" => &p.poe_power,
                "poe_voltage" => &p.poe_voltage,
            });
        }

        if p.sfp_found.val {
            fields.extend(fields! {
                "sfp_current" => &p.sfp_current,
                "sfp_voltage" => &p.sfp_voltage,
                "sfp_temperature" => &p.sfp_temperature,
                "sfp_txpower" => &p.sfp_txpower,
                "sfp_rxpower" => &p.sfp_rxpower,
            });
        }

        r.send("usw_ports", tags, fields);
    }
}

/// `usg_wan_ports`: only WANs that are up.
pub(crate) fn batch_wans(r: &mut Report, device: &Tags, wans: [&Wan; 2]) {
    for wan in wans {
        if !wan.up.val {
            continue;
        }

        let mut tags = child_tags(device);
        tags.extend(tags! {
            "ip" => wan.ip,
            "purpose" => wan.name,
            "mac" => wan.mac,
            "ifname" => wan.ifname,
            "type" => wan.wan_type,
            "up" => flag(&wan.up),
            "enabled" => flag(&wan.enable),
        });

        let fields = fields! {
            "bytes-r" => &wan.bytes_r,
            "full_duplex" => &wan.full_duplex,
            "gateway" => &wan.gateway,
            "is_uplink" => &wan.is_uplink,
            "max_speed" => &wan.max_speed,
            "rx_bytes" => &wan.rx_bytes,
            "rx_bytes-r" => &wan.rx_bytes_r,
            "rx_dropped" => &wan.rx_dropped,
            "rx_errors" => &wan.rx_errors,
            "rx_broadcast" => &wan.rx_broadcast,
            "rx_multicast" => &wan.rx_multicast,
            "rx_packets" => &wan.rx_packets,
            "speed" => &wan.speed,
            "tx_bytes" => &wan.tx_bytes,
            "tx_bytes-r" => &wan.tx_bytes_r,
            "tx_dropped" => &wan.tx_dropped,
            "tx_errors" => &wan.tx_errors,
            "tx_packets" => &wan.tx_packets,
            "tx_broadcast" => &wan.tx_broadcast,
            "tx_multicast" => &wan.tx_multicast,
        };

        r.send("usg_wan_ports", tags, fields);
    }
}

/// `usg_networks`: one record per LAN.
pub(crate) fn batch_networks(r: &mut Report, device: &Tags, networks: &[NetworkEntry]) {
    for n in networks {
        let mut tags = child_tags(device);
        tags.extend(tags! {
            "up" => flag(&n.up),
            "enabled" => flag(&n.enabled),
            "ip" => n.ip,
            "mac" => n.mac,
            "name" => n.name,
            "domain_name" => n.domain_name,
            "purpose" => n.purpose,
            "is_guest" => flag(&n.is_guest),
        });

        let fields = fields! {
            "num_sta" => &n.num_sta,
            "rx_bytes" => &n.rx_bytes,
            "rx_packets" => &n.rx_packets,
            "tx_bytes" => &n.tx_bytes,
            "tx_packets" => &n.tx_packets,
        };

        r.send("usg_networks", tags, fields);
    }
}

// ── Wireless tables ──────────────────────────────────────────────────

/// `uap_radios`: the radio table joined to its stats row by name.
pub(crate) fn batch_radios(r: &mut Report, device: &Tags, radios: &[RadioEntry], stats: &[RadioStats]) {
    for p in radios {
        let mut tags = child_tags(device);
        tags.extend(tags! {
            "channel" => p.channel.txt,
            "radio" => p.radio,
        });

        let mut fields = fields! {
            "current_antenna_gain" => &p.current_antenna_gain,
            "ht" => &p.ht.txt,
            "max_txpower" => &p.max_txpower,
            "min_txpower" => &p.min_txpower,
            "nss" => &p.nss,
            "radio_caps" => &p.radio_caps,
        };

        if let Some(t) = stats.iter().find(|t| t.name.eq_ignore_ascii_case(&p.name)) {
            fields.extend(fields! {
                "ast_be_xmit" => &t.ast_be_xmit,
                "channel" => &t.channel,
                "cu_self_rx" => &t.cu_self_rx,
                "cu_self_tx" => &t.cu_self_tx,
                "cu_total" => &t.cu_total,
                "extchannel" => &t.extchannel,
                "gain" => &t.gain,
                "guest-num_sta" => &t.guest_num_sta,
                "num_sta" => &t.num_sta,
                "radio" => &t.radio,
                "tx_packets" => &t.tx_packets,
                "tx_power" => &t.tx_power,
                "tx_retries" => &t.tx_retries,
                "user-num_sta" => &t.user_num_sta,
            });
        }

        r.send("uap_radios", tags, fields);
    }
}

/// `uap_vaps`: one record per SSID per radio.
pub(crate) fn batch_vaps(r: &mut Report, device: &Tags, vaps: &[Vap]) {
    for s in vaps {
        let mut tags = child_tags(device);
        tags.extend(tags! {
            "ap_mac" => s.ap_mac,
            "bssid" => s.bssid,
            "id" => s.id,
            "name" => s.name,
            "radio_name" => s.radio_name,
            "radio" => s.radio,
            "essid" => s.essid,
            "site_id" => s.site_id,
            "usage" => s.usage,
            "state" => s.state,
            "is_guest" => flag(&s.is_guest),
        });

        let fields = fields! {
            "ccq" => &s.ccq,
            "mac_filter_rejections" => &s.mac_filter_rejections,
            "num_satisfaction_sta" => &s.num_satisfaction_sta,
            "avg_client_signal" => &s.avg_client_signal,
            "satisfaction" => &s.satisfaction,
            "satisfaction_now" => &s.satisfaction_now,
            "num_sta" => &s.num_sta,
            "channel" => &s.channel,
            "rx_bytes" => &s.rx_bytes,
            "rx_crypts" => &s.rx_crypts,
            "rx_dropped" => &s.rx_dropped,
            "rx_errors" => &s.rx_errors,
            "rx_frags" => &s.rx_frags,
            "rx_nwids" => &s.rx_nwids,
            "rx_packets" => &s.rx_packets,
            "tx_bytes" => &s.tx_bytes,
            "tx_dropped" => &s.tx_dropped,
            "tx_errors" => &s.tx_errors,
            "tx_packets" => &s.tx_packets,
            "tx_power" => &s.tx_power,
            "tx_retries" => &s.tx_retries,
            "tx_combined_retries" => &s.tx_combined_retries,
            "tx_data_mpdu_bytes" => &s.tx_data_mpdu_bytes,
            "tx_rts_retries" => &s.tx_rts_retries,
            "tx_success" => &s.tx_success,
            "tx_total" => &s.tx_total,
            "tx_tcp_goodbytes" => &s.tx_tcp_stats.goodbytes,
            "tx_tcp_lat_avg" => &s.tx_tcp_stats.lat_avg,
            "tx_tcp_lat_max" => &s.tx_tcp_stats.lat_max,
            "tx_tcp_lat_min" => &s.tx_tcp_stats.lat_min,
            "rx_tcp_goodbytes" => &s.rx_tcp_stats.goodbytes,
            "rx_tcp_lat_avg" => &s.rx_tcp_stats.lat_avg,
            "rx_tcp_lat_max" => &s.rx_tcp_stats.lat_max,
            "rx_tcp_lat_min" => &s.rx_tcp_stats.lat_min,
            "wifi_tx_latency_mov_avg" => &s.wifi_tx_latency_mov.avg,
            "wifi_tx_latency_mov_max" => &s.wifi_tx_latency_mov.max,
            "wifi_tx_latency_mov_min" => &s.wifi_tx_latency_mov.min,
            "wifi_tx_latency_mov_total" => &s.wifi_tx_latency_mov.total,
            "wifi_tx_latency_mov_count" => &s.wifi_tx_latency_mov.total_count,
        };

        r.send("uap_vaps", tags, fields);
    }
}
