// Switch records

use unpoller_api::Usw;

use crate::devices::{self, USW_STATS};
use crate::point::fields;
use crate::report::Report;

pub(crate) fn batch_usw(r: &mut Report, s: &Usw, dead_ports: bool) {
    let d = &s.common;
    if devices::skip(d) {
        return;
    }

    let tags = devices::device_tags(d);
    let mut fields = devices::stat_fields(&d.stat, USW_STATS, "stat_");
    fields.extend(devices::sys_stats(d));
    fields.extend(devices::common_fields(d));
    fields.extend(fields! {
        "fan_level" => &s.fan_level,
        "general_temperature" => &s.general_temperature,
        "total_max_power" => &s.total_max_power,
        "uplink_speed" => &s.uplink.speed,
        "uplink_max_speed" => &s.uplink.max_speed,
        "uplink_latency" => &s.uplink.latency,
        "uplink_uptime" => &s.uplink.uptime,
    });

    r.counts.usw += 1;
    r.send("usw", tags.clone(), fields);
    devices::batch_port_table(r, &tags, &s.port_table, dead_ports);
}
