// Site health and site DPI records

use unpoller_api::dpi::{application_name, category_name};
use unpoller_api::{DpiTable, Site};

use crate::point::{fields, tags};
use crate::report::Report;

/// One `subsystems` record per health entry.
pub(crate) fn batch_site(r: &mut Report, s: &Site) {
    for h in &s.health {
        let tags = tags! {
            "name" => s.name,
            "site_name" => s.site_name,
            "source" => s.source_name,
            "desc" => s.desc,
            "status" => h.status,
            "subsystem" => h.subsystem,
            "wan_ip" => h.wan_ip,
            "gw_name" => h.gw_name,
            "lan_ip" => h.lan_ip,
        };
        let fields = fields! {
            "num_user" => &h.num_user,
            "num_guest" => &h.num_guest,
            "num_iot" => &h.num_iot,
            "tx_bytes-r" => h.tx_bytes_r.int64(),
            "rx_bytes-r" => h.rx_bytes_r.int64(),
            "num_ap" => &h.num_ap,
            "num_adopted" => &h.num_adopted,
            "num_disabled" => &h.num_disabled,
            "num_disconnected" => &h.num_disconnected,
            "num_pending" => &h.num_pending,
            "num_gw" => &h.num_gw,
            "wan_ip" => &h.wan_ip,
            "num_sta" => &h.num_sta,
            "gw_cpu" => &h.gw_system_stats.cpu,
            "gw_mem" => &h.gw_system_stats.mem,
            "gw_uptime" => &h.gw_system_stats.uptime,
            "latency" => &h.latency,
            "uptime" => h.uptime.int64(),
            "drops" => &h.drops,
            "xput_up" => &h.xput_up,
            "xput_down" => &h.xput_down,
            "speedtest_ping" => &h.speedtest_ping,
            "speedtest_lastrun" => &h.speedtest_lastrun,
            "num_sw" => &h.num_sw,
            "remote_user_num_active" => &h.remote_user_num_active,
            "remote_user_num_inactive" => &h.remote_user_num_inactive,
            "remote_user_rx_bytes" => &h.remote_user_rx_bytes,
            "remote_user_tx_bytes" => &h.remote_user_tx_bytes,
            "remote_user_rx_packets" => &h.remote_user_rx_packets,
            "remote_user_tx_packets" => &h.remote_user_tx_packets,
            "num_new_alarms" => &s.num_new_alarms,
        };

        r.send("subsystems", tags, fields);
    }
}

pub(crate) fn batch_site_dpi(r: &mut Report, table: &DpiTable) {
    for dpi in &table.by_app {
        r.send(
            "sitedpi",
            tags! {
                "category" => category_name(dpi.cat.int64()),
                "application" => application_name(dpi.cat.int64(), dpi.app.int64()),
                "site_name" => table.site_name,
                "source" => table.source_name,
            },
            fields! {
                "tx_packets" => dpi.tx_packets.int64(),
                "rx_packets" => dpi.rx_packets.int64(),
                "tx_bytes" => dpi.tx_bytes.int64(),
                "rx_bytes" => dpi.rx_bytes.int64(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unpoller_api::{FlexInt, Health};
    use unpoller_core::Metrics;

    #[test]
    fn one_subsystem_record_per_health_entry() {
        let site = Site {
            name: "default".into(),
            site_name: "Home (default)".into(),
            source_name: "https://ctrl".into(),
            health: vec![
                Health {
                    subsystem: "wlan".into(),
                    status: "ok".into(),
                    num_ap: FlexInt::new(2.0),
                    ..Health::default()
                },
                Health {
                    subsystem: "wan".into(),
                    num_gw: FlexInt::new(1.0),
                    ..Health::default()
                },
            ],
            ..Site::default()
        };
        let mut r = Report::new(&Metrics::default());
        batch_site(&mut r, &site);

        let lines: Vec<_> = r.points().iter().map(crate::point::Point::to_line).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("subsystem=wlan") && lines[0].contains("num_ap=2"));
        assert!(lines[1].contains("subsystem=wan") && lines[1].contains("num_gw=1"));
        assert!(lines[0].contains("site_name=Home\\ (default)"));
    }
}
