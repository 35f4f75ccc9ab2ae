// Dream machine metrics
//
// A UDM has no descriptors of its own: it exports the switch, gateway and
// (when it has radios) access point sets under its own device labels.

use unpoller_api::Udm;

use crate::descs::Descs;
use crate::device::{device_labels, skip};
use crate::export::Batch;

pub(crate) fn export_udm(descs: &Descs, s: &Udm) -> Batch {
    let d = &s.common;
    let mut b = Batch::default();
    if skip(d) {
        return b;
    }

    let l = device_labels(d);
    let dev = &descs.device;

    dev.export_bytes(&mut b, d, &l);
    dev.export_sys(&mut b, d, &l);
    dev.export_stations(
        &mut b,
        &l,
        &[
            ("user", &d.user_num_sta),
            ("guest", &d.guest_num_sta),
            ("desktop", &s.num_desktop),
            ("mobile", &s.num_mobile),
            ("handheld", &s.num_handheld),
        ],
    );
    descs.usw.export_stats(&mut b, &d.stat, &l);
    descs.usw.export_ports(&mut b, &s.port_table, &l);
    descs.usg.export_wans(&mut b, &[&s.wan1, &s.wan2], &l);
    descs.usg.export_stats(&mut b, &d.stat, &s.speedtest_status, &s.uplink, &l);
    dev.export_info(&mut b, d, &l);
    dev.export_temperature(&mut b, &l, &s.has_temperature, &s.general_temperature);
    dev.export_fan(&mut b, &l, &s.has_fan, &s.fan_level);
    dev.export_max_power(&mut b, &l, &s.total_max_power);

    if !s.radio_table.is_empty() {
        descs.uap.export_stats(&mut b, &d.stat, &l);
        b.add(&dev.bytes_r, &d.bytes_r, &l);
        descs.uap.export_vaps(&mut b, &s.vap_table, &l);
        descs
            .uap
            .export_radios(&mut b, &s.radio_table, &s.radio_table_stats, &l);
    }

    b
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use prometheus::Registry;
    use unpoller_api::models::{RadioEntry, SystemStats};
    use unpoller_api::{DeviceCommon, FlexBool, FlexInt};

    use super::*;

    fn udm(radios: bool) -> Udm {
        Udm {
            common: DeviceCommon {
                device_type: "udm".into(),
                name: "dream".into(),
                adopted: FlexBool::new(true),
                system_stats: SystemStats {
                    cpu: FlexInt::new(30.0),
                    ..SystemStats::default()
                },
                ..DeviceCommon::default()
            },
            radio_table: if radios {
                vec![RadioEntry {
                    name: "wifi0".into(),
                    ..RadioEntry::default()
                }]
            } else {
                Vec::new()
            },
            ..Udm::default()
        }
    }

    #[test]
    fn udm_without_radios_skips_wireless_sets() {
        let registry = Registry::new();
        let descs = Descs::new(&registry, "unifipoller").unwrap();

        let samples = export_udm(&descs, &udm(false)).into_samples();
        // bytes 3, sys 8, stations 5, info 3.
        assert_eq!(samples.len(), 3 + 8 + 5 + 3);
        assert_eq!(samples[3 + 6].value.as_f64(), 0.3);
    }

    #[test]
    fn udm_with_radios_adds_rate_and_radio_table() {
        let registry = Registry::new();
        let descs = Descs::new(&registry, "unifipoller").unwrap();

        let samples = export_udm(&descs, &udm(true)).into_samples();
        assert_eq!(samples.len(), 3 + 8 + 5 + 3 + 1 + 6);
        assert_eq!(samples.last().unwrap().labels[0], "wifi0");
    }
}
