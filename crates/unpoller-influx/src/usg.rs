// Gateway records

use unpoller_api::Usg;

use crate::devices::{self, USG_STATS};
use crate::point::fields;
use crate::report::Report;

pub(crate) fn batch_usg(r: &mut Report, s: &Usg) {
    let d = &s.common;
    if devices::skip(d) {
        return;
    }

    let tags = devices::device_tags(d);
    let mut fields = devices::stat_fields(&d.stat, USG_STATS, "");
    fields.extend(devices::sys_stats(d));
    fields.extend(devices::gateway_fields(&s.speedtest_status, &s.uplink));
    fields.extend(devices::common_fields(d));
    fields.extend(fields! {
        "license_state" => &s.license_state,
        "version" => &d.version,
        "num_desktop" => &s.num_desktop,
        "num_handheld" => &s.num_handheld,
        "num_mobile" => &s.num_mobile,
        "general_temperature" => &s.general_temperature,
    });

    r.counts.usg += 1;
    r.send("usg", tags.clone(), fields);
    devices::batch_networks(r, &tags, &s.network_table);
    devices::batch_wans(r, &tags, [&s.wan1, &s.wan2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use unpoller_api::models::{NetworkEntry, Wan};
    use unpoller_api::{DeviceCommon, FlexBool, FlexInt};
    use unpoller_core::Metrics;

    #[test]
    fn gateway_emits_networks_and_live_wans() {
        let usg = Usg {
            common: DeviceCommon {
                name: "gw".into(),
                adopted: FlexBool::new(true),
                uptime: FlexInt::new(9.0),
                ..DeviceCommon::default()
            },
            wan1: Wan {
                name: "wan".into(),
                up: FlexBool::new(true),
                rx_bytes: FlexInt::new(7.0),
                ..Wan::default()
            },
            wan2: Wan {
                name: "wan2".into(),
                rx_bytes: FlexInt::new(7.0),
                ..Wan::default()
            },
            network_table: vec![NetworkEntry {
                name: "LAN".into(),
                num_sta: FlexInt::new(4.0),
                ..NetworkEntry::default()
            }],
            ..Usg::default()
        };

        let mut r = Report::new(&Metrics::default());
        batch_usg(&mut r, &usg);

        let lines: Vec<_> = r.points().iter().map(crate::point::Point::to_line).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("usg,name=gw"));
        assert!(lines[1].starts_with("usg_networks,"));
        assert!(lines[2].starts_with("usg_wan_ports,") && lines[2].contains("purpose=wan,"));
        assert_eq!(r.counts.usg, 1);
    }
}
