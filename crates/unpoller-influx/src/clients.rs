// Client and client DPI records
//
// Wired clients carry only their wired counters; wireless clients carry
// the radio view. DPI records are summed per controller and site so one
// TOTAL record per category (and optionally per application) follows.

use std::collections::BTreeMap;

use unpoller_api::dpi::{application_name, category_name};
use unpoller_api::{Client, DpiApp, DpiTable};

use crate::point::{fields, flag, tags};
use crate::report::Report;

const TOTAL: &str = "TOTAL";

pub(crate) fn batch_client(r: &mut Report, c: &Client) {
    let tags = tags! {
        "mac" => c.mac,
        "site_name" => c.site_name,
        "source" => c.source_name,
        "ap_name" => c.ap_name,
        "gw_name" => c.gw_name,
        "sw_name" => c.sw_name,
        "oui" => c.oui,
        "radio_name" => c.radio_name,
        "radio" => c.radio,
        "radio_proto" => c.radio_proto,
        "name" => c.name,
        "fixed_ip" => c.fixed_ip,
        "sw_port" => c.sw_port.txt,
        "os_class" => c.os_class.txt,
        "os_name" => c.os_name.txt,
        "dev_cat" => c.dev_cat.txt,
        "dev_id" => c.dev_id.txt,
        "dev_vendor" => c.dev_vendor.txt,
        "dev_family" => c.dev_family.txt,
        "is_wired" => flag(&c.is_wired),
        "is_guest" => flag(&c.is_guest),
        "use_fixedip" => flag(&c.use_fixedip),
        "channel" => c.channel.txt,
        "vlan" => c.vlan.txt,
    };

    let mut fields = fields! {
        "ip" => &c.ip,
        "hostname" => &c.hostname,
        "note" => &c.note,
        "uptime" => c.uptime,
    };

    if c.is_wired.val {
        fields.extend(fields! {
            "rx_bytes" => c.wired_rx_bytes,
            "rx_bytes_r" => c.wired_rx_bytes_r,
            "rx_packets" => c.wired_rx_packets,
            "tx_bytes" => c.wired_tx_bytes,
            "tx_bytes_r" => c.wired_tx_bytes_r,
            "tx_packets" => c.wired_tx_packets,
        });
    } else {
        fields.extend(fields! {
            "anomalies" => c.anomalies,
            "essid" => &c.essid,
            "bssid" => &c.bssid,
            "channel" => &c.channel,
            "radio_desc" => &c.radio_description,
            "satisfaction" => &c.satisfaction,
            "bytes_r" => c.bytes_r,
            "ccq" => c.ccq,
            "noise" => c.noise,
            "roam_count" => c.roam_count,
            "rssi" => c.rssi,
            "signal" => c.signal,
            "rx_bytes" => c.rx_bytes,
            "rx_bytes_r" => c.rx_bytes_r,
            "rx_packets" => c.rx_packets,
            "rx_rate" => c.rx_rate,
            "tx_bytes" => c.tx_bytes,
            "tx_bytes_r" => c.tx_bytes_r,
            "tx_packets" => c.tx_packets,
            "tx_retries" => c.tx_retries,
            "tx_power" => c.tx_power,
            "tx_rate" => c.tx_rate,
            "wifi_tx_attempts" => c.wifi_tx_attempts,
        });
    }

    r.send("clients", tags, fields);
}

/// Summed DPI counters for one name within one site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DpiSum {
    pub tx_packets: i64,
    pub rx_packets: i64,
    pub tx_bytes: i64,
    pub rx_bytes: i64,
}

impl DpiSum {
    fn add(&mut self, dpi: &DpiApp) {
        self.tx_packets += dpi.tx_packets.int64();
        self.rx_packets += dpi.rx_packets.int64();
        self.tx_bytes += dpi.tx_bytes.int64();
        self.rx_bytes += dpi.rx_bytes.int64();
    }
}

/// controller -> site -> category or application name -> sums
type TotalsMap = BTreeMap<String, BTreeMap<String, BTreeMap<String, DpiSum>>>;

/// Running DPI totals for one batch.
#[derive(Debug, Default)]
pub(crate) struct DpiTotals {
    apps: TotalsMap,
    cats: TotalsMap,
}

impl DpiTotals {
    fn fill(map: &mut TotalsMap, table: &DpiTable, name: &str, dpi: &DpiApp) {
        map.entry(table.source_name.clone())
            .or_default()
            .entry(table.site_name.clone())
            .or_default()
            .entry(name.to_owned())
            .or_default()
            .add(dpi);
    }

    /// Emit the TOTAL records. Application totals are opt-in because
    /// they run to thousands of series per site.
    pub(crate) fn report(&self, r: &mut Report, with_apps: bool) {
        if with_apps {
            Self::emit(r, &self.apps, "application");
        }
        Self::emit(r, &self.cats, "category");
    }

    fn emit(r: &mut Report, map: &TotalsMap, kind: &str) {
        for (controller, sites) in map {
            for (site, names) in sites {
                for (name, sum) in names {
                    let mut tags = tags! {
                        "category" => TOTAL,
                        "application" => TOTAL,
                        "name" => TOTAL,
                        "mac" => TOTAL,
                        "site_name" => site,
                        "source" => controller,
                    };
                    tags.insert(kind.to_owned(), name.clone());

                    r.send("clientdpi", tags, dpi_fields(sum));
                }
            }
        }
    }
}

fn dpi_fields(sum: &DpiSum) -> crate::point::Fields {
    fields! {
        "tx_packets" => sum.tx_packets,
        "rx_packets" => sum.rx_packets,
        "tx_bytes" => sum.tx_bytes,
        "rx_bytes" => sum.rx_bytes,
    }
}

pub(crate) fn batch_client_dpi(r: &mut Report, table: &DpiTable, totals: &mut DpiTotals) {
    for dpi in &table.by_app {
        let category = category_name(dpi.cat.int64());
        let application = application_name(dpi.cat.int64(), dpi.app.int64());
        DpiTotals::fill(&mut totals.apps, table, &application, dpi);
        DpiTotals::fill(&mut totals.cats, table, category, dpi);

        let mut sum = DpiSum::default();
        sum.add(dpi);

        r.send(
            "clientdpi",
            tags! {
                "category" => category,
                "application" => application,
                "name" => table.name,
                "mac" => table.mac,
                "site_name" => table.site_name,
                "source" => table.source_name,
            },
            dpi_fields(&sum),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unpoller_api::{FlexBool, FlexInt};
    use unpoller_core::Metrics;

    fn lines(r: &Report) -> Vec<String> {
        r.points().iter().map(crate::point::Point::to_line).collect()
    }

    #[test]
    fn wired_client_carries_only_wired_counters() {
        let client = Client {
            mac: "00:11:22:33:44:55".into(),
            is_wired: FlexBool::new(true),
            wired_rx_bytes: 100,
            wired_tx_bytes: 200,
            rx_bytes: 9,
            rssi: 40,
            signal: -60,
            ccq: 900,
            uptime: 10,
            ..Client::default()
        };
        let mut r = Report::new(&Metrics::default());
        batch_client(&mut r, &client);

        let line = &lines(&r)[0];
        assert!(line.starts_with("clients,is_guest=false,is_wired=true,mac=00:11:22:33:44:55"));
        assert!(line.contains("rx_bytes=100i"), "{line}");
        assert!(line.contains("tx_bytes=200i"), "{line}");
        assert!(line.contains("uptime=10i"), "{line}");
        for wireless in ["rssi", "signal", "ccq"] {
            assert!(!line.contains(&format!("{wireless}=")), "{line}");
        }
    }

    #[test]
    fn wireless_client_carries_radio_fields() {
        let client = Client {
            mac: "aa".into(),
            rssi: 40,
            ccq: 900,
            satisfaction: FlexInt::new(98.0),
            wired_rx_bytes: 5,
            ..Client::default()
        };
        let mut r = Report::new(&Metrics::default());
        batch_client(&mut r, &client);

        let line = &lines(&r)[0];
        assert!(line.contains("rssi=40i") && line.contains("ccq=900i"), "{line}");
        assert!(line.contains("satisfaction=98"), "{line}");
        assert!(!line.contains("rx_bytes=5i"), "{line}");
    }

    fn dpi_table(mac: &str) -> DpiTable {
        DpiTable {
            mac: mac.into(),
            name: mac.into(),
            site_name: "S".into(),
            source_name: "C".into(),
            by_app: vec![DpiApp {
                cat: FlexInt::new(1.0),
                app: FlexInt::new(5.0),
                tx_bytes: FlexInt::new(10.0),
                rx_bytes: FlexInt::new(20.0),
                ..DpiApp::default()
            }],
            ..DpiTable::default()
        }
    }

    #[test]
    fn dpi_totals_sum_per_category() {
        let mut r = Report::new(&Metrics::default());
        let mut totals = DpiTotals::default();
        batch_client_dpi(&mut r, &dpi_table("aa"), &mut totals);
        batch_client_dpi(&mut r, &dpi_table("bb"), &mut totals);
        totals.report(&mut r, false);

        let lines = lines(&r);
        assert_eq!(lines.len(), 3);

        let total = lines.iter().find(|l| l.contains("mac=TOTAL")).unwrap();
        let prefix = format!(
            "clientdpi,application=TOTAL,category={},mac=TOTAL,name=TOTAL,site_name=S,source=C ",
            category_name(1)
        );
        assert!(total.starts_with(&prefix), "{total}");
        assert!(total.contains("rx_bytes=40i,tx_bytes=20i"), "{total}");
    }

    #[test]
    fn application_totals_are_opt_in() {
        let mut r = Report::new(&Metrics::default());
        let mut totals = DpiTotals::default();
        batch_client_dpi(&mut r, &dpi_table("aa"), &mut totals);
        totals.report(&mut r, true);

        let totals: Vec<_> = lines(&r).into_iter().filter(|l| l.contains("mac=TOTAL")).collect();
        assert_eq!(totals.len(), 2);
        assert!(totals[0].contains("application=Unknown\\ (1:5),category=TOTAL"));
    }
}
