// Dream Machine records
//
// A UDM is recorded as the gateway, switch and (when it has radios)
// access point it contains, under the same measurement names.

use unpoller_api::Udm;

use crate::devices::{self, UAP_STATS, USG_STATS, USW_STATS};
use crate::point::fields;
use crate::report::Report;

pub(crate) fn batch_udm(r: &mut Report, s: &Udm, dead_ports: bool) {
    let d = &s.common;
    if devices::skip(d) {
        return;
    }

    let tags = devices::device_tags(d);
    r.counts.udm += 1;

    let mut gateway = devices::stat_fields(&d.stat, USG_STATS, "");
    gateway.extend(devices::sys_stats(d));
    gateway.extend(devices::gateway_fields(&s.speedtest_status, &s.uplink));
    gateway.extend(devices::common_fields(d));
    gateway.extend(fields! {
        "license_state" => &s.license_state,
        "version" => &d.version,
        "num_desktop" => &s.num_desktop,
        "num_handheld" => &s.num_handheld,
        "num_mobile" => &s.num_mobile,
        "general_temperature" => &s.general_temperature,
    });
    r.send("usg", tags.clone(), gateway);
    devices::batch_networks(r, &tags, &s.network_table);
    devices::batch_wans(r, &tags, [&s.wan1, &s.wan2]);

    let mut switch = devices::stat_fields(&d.stat, USW_STATS, "stat_");
    switch.extend(devices::common_fields(d));
    switch.extend(fields! {
        "fan_level" => &s.fan_level,
        "total_max_power" => &s.total_max_power,
    });
    r.send("usw", tags.clone(), switch);
    devices::batch_port_table(r, &tags, &s.port_table, dead_ports);

    if s.radio_table.is_empty() {
        return;
    }

    let mut ap = devices::stat_fields(&d.stat, UAP_STATS, "stat_");
    ap.extend(devices::common_fields(d));
    ap.extend(fields! { "num_sta" => &d.num_sta });
    r.send("uap", tags.clone(), ap);
    devices::batch_radios(r, &tags, &s.radio_table, &s.radio_table_stats);
    devices::batch_vaps(r, &tags, &s.vap_table);
}
