// Event, IDS, alarm and anomaly records
//
// These carry their own timestamps. Anything older than one interval
// (plus a second of slack) was already written on an earlier tick.

use std::time::Duration;

use chrono::{DateTime, Utc};

use unpoller_api::{Anomaly, Event, IpGeo};

use crate::point::{Fields, fields, flag, tags};
use crate::report::Report;

/// True when `ts` falls outside the current window.
fn stale(ts: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    (now - ts).to_std().is_ok_and(|age| age > max_age)
}

fn geo_fields(prefix: &str, geo: &IpGeo) -> Fields {
    let mut fields = Fields::new();
    let mut put = |key: &str, value: crate::point::FieldValue| {
        fields.insert(format!("{prefix}_{key}"), value);
    };
    put("asn", geo.asn.into());
    put("latitude", geo.latitude.into());
    put("longitude", geo.longitude.into());
    put("city", (&geo.city).into());
    put("continent_code", (&geo.continent_code).into());
    put("country_code", (&geo.country_code).into());
    put("country_name", (&geo.country_name).into());
    put("organization", (&geo.organization).into());
    fields
}

/// Fields shared by IDS hits and alarms.
fn alert_fields(e: &Event) -> Fields {
    let mut fields = fields! {
        "dest_port" => &e.dest_port,
        "src_port" => &e.src_port,
        "dest_ip" => &e.dest_ip,
        "dst_mac" => &e.dst_mac,
        "host" => &e.host,
        "msg" => &e.msg,
        "src_ip" => &e.src_ip,
        "src_mac" => &e.src_mac,
    };
    fields.extend(geo_fields("dstip", &e.dst_ip_geo));
    fields.extend(geo_fields("srcip", &e.src_ip_geo));
    fields
}

fn alert_tags(e: &Event) -> crate::point::Tags {
    tags! {
        "site_name" => e.site_name,
        "source" => e.source_name,
        "in_iface" => e.in_iface,
        "event_type" => e.event_type,
        "subsystem" => e.subsystem,
        "archived" => flag(&e.archived),
        "usgip" => e.usgip,
        "proto" => e.proto,
        "key" => e.key,
        "catname" => e.catname,
        "app_proto" => e.app_proto,
        "action" => e.inner_alert_action,
    }
}

pub(crate) fn batch_ids(r: &mut Report, e: &Event, now: DateTime<Utc>, max_age: Duration) {
    let ts = e.when();
    if stale(ts, now, max_age) {
        return;
    }

    r.counts.ids += 1;
    r.send_at("unifi_ids", alert_tags(e), alert_fields(e), ts);
}

pub(crate) fn batch_alarm(r: &mut Report, e: &Event, now: DateTime<Utc>, max_age: Duration) {
    let ts = e.when();
    if stale(ts, now, max_age) {
        return;
    }

    r.counts.alarm += 1;
    r.send_at("unifi_alarm", alert_tags(e), alert_fields(e), ts);
}

pub(crate) fn batch_event(r: &mut Report, e: &Event, now: DateTime<Utc>, max_age: Duration) {
    let ts = e.when();
    if stale(ts, now, max_age) {
        return;
    }

    let tags = tags! {
        "site_name" => e.site_name,
        "source" => e.source_name,
        "in_iface" => e.in_iface,
        "event_type" => e.event_type,
        "subsystem" => e.subsystem,
        "is_admin" => flag(&e.is_admin),
        "gw_name" => e.gw_name,
        "ap_name" => e.ap_name,
        "sw_name" => e.sw_name,
        "ssid" => e.ssid,
    };

    let mut fields = fields! {
        "dest_port" => &e.dest_port,
        "src_port" => &e.src_port,
        "bytes" => &e.bytes,
        "duration" => &e.duration,
        "admin" => &e.admin,
        "ap" => &e.ap,
        "ap_from" => &e.ap_from,
        "ap_name" => &e.ap_name,
        "ap_to" => &e.ap_to,
        "app_proto" => &e.app_proto,
        "catname" => &e.catname,
        "channel" => &e.channel,
        "channel_from" => &e.channel_from,
        "channel_to" => &e.channel_to,
        "dest_ip" => &e.dest_ip,
        "dst_mac" => &e.dst_mac,
        "guest" => &e.guest,
        "gw" => &e.gw,
        "gw_name" => &e.gw_name,
        "host" => &e.host,
        "hostname" => &e.hostname,
        "ip" => &e.ip,
        "inner_alert_action" => &e.inner_alert_action,
        "inner_alert_category" => &e.inner_alert_category,
        "key" => &e.key,
        "msg" => &e.msg,
        "network" => &e.network,
        "proto" => &e.proto,
        "radio" => &e.radio,
        "radio_from" => &e.radio_from,
        "radio_to" => &e.radio_to,
        "src_ip" => &e.src_ip,
        "src_mac" => &e.src_mac,
        "ssid" => &e.ssid,
        "sw" => &e.sw,
        "sw_name" => &e.sw_name,
        "user" => &e.user,
        "usgip" => &e.usgip,
    };
    fields.extend(geo_fields("dstipGeo", &e.dst_ip_geo));
    fields.extend(geo_fields("srcipGeo", &e.src_ip_geo));

    r.counts.event += 1;
    r.send_at("unifi_events", tags, fields, ts);
}

pub(crate) fn batch_anomaly(r: &mut Report, a: &Anomaly, now: DateTime<Utc>, max_age: Duration) {
    if stale(a.datetime, now, max_age) {
        return;
    }

    r.counts.anomaly += 1;
    r.send_at(
        "unifi_anomaly",
        tags! {
            "application" => "unifi_anomaly",
            "source" => a.source_name,
            "site_name" => a.site_name,
            "device_mac" => a.device_mac,
        },
        fields! { "msg" => &a.anomaly },
        a.datetime,
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use unpoller_core::Metrics;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_060, 0).unwrap()
    }

    fn event(at: i64) -> Event {
        Event {
            key: "EVT_WU_Connected".into(),
            msg: "User connected".into(),
            datetime: Utc.timestamp_opt(at, 0).single(),
            ..Event::default()
        }
    }

    #[test]
    fn recent_event_keeps_its_own_timestamp() {
        let mut r = Report::new(&Metrics::default());
        batch_event(&mut r, &event(1_700_000_050), now(), Duration::from_secs(31));

        let line = r.points()[0].to_line();
        assert!(line.starts_with("unifi_events,is_admin=false "), "{line}");
        assert!(line.ends_with(" 1700000050000000000"), "{line}");
        assert_eq!(r.counts.event, 1);
    }

    #[test]
    fn stale_records_are_dropped() {
        let mut r = Report::new(&Metrics::default());
        batch_event(&mut r, &event(1_700_000_000), now(), Duration::from_secs(31));
        batch_alarm(&mut r, &event(1_699_000_000), now(), Duration::from_secs(31));
        batch_anomaly(
            &mut r,
            &Anomaly {
                datetime: Utc.timestamp_opt(1_699_999_000, 0).unwrap(),
                anomaly: "USER_HIGH_TCP_LATENCY".into(),
                ..Anomaly::default()
            },
            now(),
            Duration::from_secs(31),
        );
        assert!(r.points().is_empty());
        assert_eq!(r.counts.event + r.counts.alarm + r.counts.anomaly, 0);
    }

    #[test]
    fn ids_geo_fields_are_prefixed() {
        let mut ids = event(1_700_000_055);
        ids.dst_ip_geo.city = "Mountain View".into();
        ids.dst_ip_geo.asn = 15169;

        let mut r = Report::new(&Metrics::default());
        batch_ids(&mut r, &ids, now(), Duration::from_secs(31));

        let line = r.points()[0].to_line();
        assert!(line.contains("dstip_asn=15169i"), "{line}");
        assert!(line.contains("dstip_city=\"Mountain View\""), "{line}");
        assert!(line.contains("key=EVT_WU_Connected"), "{line}");
    }
}
