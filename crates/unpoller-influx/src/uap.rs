// Access point records

use unpoller_api::Uap;

use crate::devices::{self, UAP_STATS};
use crate::point::fields;
use crate::report::Report;

pub(crate) fn batch_uap(r: &mut Report, s: &Uap, dead_ports: bool) {
    let d = &s.common;
    if devices::skip(d) {
        return;
    }

    let tags = devices::device_tags(d);
    let mut fields = devices::stat_fields(&d.stat, UAP_STATS, "stat_");
    fields.extend(devices::sys_stats(d));
    fields.extend(devices::common_fields(d));
    fields.extend(fields! {
        "num_sta" => &d.num_sta,
        "general_temperature" => &s.general_temperature,
    });

    r.counts.uap += 1;
    r.send("uap", tags.clone(), fields);
    devices::batch_radios(r, &tags, &s.radio_table, &s.radio_table_stats);
    devices::batch_vaps(r, &tags, &s.vap_table);
    devices::batch_port_table(r, &tags, &s.port_table, dead_ports);
}
