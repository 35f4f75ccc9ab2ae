// Client and client DPI metrics
//
// Wired clients export their wired counters; wireless clients export the
// radio view. Both export uptime. DPI rows are summed per controller and
// site so one TOTAL series per category follows the per-client ones.

use std::collections::BTreeMap;

use prometheus::Result;

use unpoller_api::dpi::{application_name, category_name};
use unpoller_api::{Client, DpiTable, FlexInt};

use crate::export::{Batch, Builder, Desc, labels};

const LABELS: &[&str] = &[
    "name", "mac", "site_name", "gw_name", "sw_name", "vlan", "ip", "oui", "network", "sw_port",
    "ap_name", "source", "wired",
];

const LABELS_WIRELESS: &[&str] = &[
    "radio_name", "radio", "radio_proto", "channel", "essid", "bssid", "radio_desc", "name", "mac",
    "site_name", "gw_name", "sw_name", "vlan", "ip", "oui", "network", "sw_port", "ap_name",
    "source", "wired",
];

const LABELS_DPI: &[&str] = &["name", "mac", "site_name", "source", "category", "application"];

const TOTAL: &str = "TOTAL";

pub(crate) struct ClientDescs {
    anomalies: Desc,
    bytes_r: Desc,
    ccq: Desc,
    satisfaction: Desc,
    noise: Desc,
    roam_count: Desc,
    rssi: Desc,
    rx_bytes: Desc,
    rx_bytes_r: Desc,
    rx_packets: Desc,
    rx_rate: Desc,
    signal: Desc,
    tx_bytes: Desc,
    tx_bytes_r: Desc,
    tx_packets: Desc,
    tx_retries: Desc,
    tx_power: Desc,
    tx_rate: Desc,
    uptime: Desc,
    wifi_tx_attempts: Desc,
    dpi_tx_packets: Desc,
    dpi_rx_packets: Desc,
    dpi_tx_bytes: Desc,
    dpi_rx_bytes: Desc,
}

impl ClientDescs {
    pub(crate) fn new(b: &mut Builder<'_>) -> Result<Self> {
        b.subsystem("client");
        let w = LABELS_WIRELESS;

        Ok(Self {
            anomalies: b.counter("anomalies_total", "Client Anomalies", w)?,
            bytes_r: b.gauge("transfer_rate_bytes", "Client Data Rate", w)?,
            ccq: b.gauge("ccq_ratio", "Client Connection Quality", w)?,
            satisfaction: b.gauge("satisfaction_ratio", "Client Satisfaction", w)?,
            noise: b.gauge("noise_db", "Client AP Noise", w)?,
            roam_count: b.counter("roam_count_total", "Client Roam Counter", w)?,
            rssi: b.gauge("rssi_db", "Client RSSI", w)?,
            rx_bytes: b.counter("receive_bytes_total", "Client Receive Bytes", LABELS)?,
            rx_bytes_r: b.gauge("receive_rate_bytes", "Client Receive Data Rate", LABELS)?,
            rx_packets: b.counter("receive_packets_total", "Client Receive Packets", LABELS)?,
            rx_rate: b.gauge("radio_receive_rate_bps", "Client Receive Rate", w)?,
            signal: b.gauge("radio_signal_db", "Client Signal Strength", w)?,
            tx_bytes: b.counter("transmit_bytes_total", "Client Transmit Bytes", LABELS)?,
            tx_bytes_r: b.gauge("transmit_rate_bytes", "Client Transmit Data Rate", LABELS)?,
            tx_packets: b.counter("transmit_packets_total", "Client Transmit Packets", LABELS)?,
            tx_retries: b.counter("transmit_retries_total", "Client Transmit Retries", LABELS)?,
            tx_power: b.gauge("radio_transmit_power_dbm", "Client Transmit Power", w)?,
            tx_rate: b.gauge("radio_transmit_rate_bps", "Client Transmit Rate", w)?,
            uptime: b.gauge("uptime_seconds", "Client Uptime", w)?,
            wifi_tx_attempts: b.counter(
                "wifi_attempts_transmit_total",
                "Client Wifi Transmit Attempts",
                w,
            )?,
            dpi_tx_packets: b.counter("dpi_transmit_packets", "Client DPI Transmit Packets", LABELS_DPI)?,
            dpi_rx_packets: b.counter("dpi_receive_packets", "Client DPI Receive Packets", LABELS_DPI)?,
            dpi_tx_bytes: b.counter("dpi_transmit_bytes", "Client DPI Transmit Bytes", LABELS_DPI)?,
            dpi_rx_bytes: b.counter("dpi_receive_bytes", "Client DPI Receive Bytes", LABELS_DPI)?,
        })
    }

    pub(crate) fn export(&self, c: &Client) -> Batch {
        let wired = if c.is_wired.val { "true" } else { "false" };
        let base = labels(&[
            &c.name,
            &c.mac,
            &c.site_name,
            &c.gw_name,
            &c.sw_name,
            &c.vlan.txt,
            &c.ip,
            &c.oui,
            &c.network,
            &c.sw_port.txt,
            &c.ap_name,
            &c.source_name,
            wired,
        ]);
        let mut radio = labels(&[
            &c.radio_name,
            &c.radio,
            &c.radio_proto,
            &c.channel.txt,
            &c.essid,
            &c.bssid,
            &c.radio_description,
        ]);
        radio.extend(base.iter().cloned());

        let mut b = Batch::default();
        if c.is_wired.val {
            b.add(&self.rx_bytes, c.wired_rx_bytes, &base);
            b.add(&self.rx_bytes_r, c.wired_rx_bytes_r, &base);
            b.add(&self.rx_packets, c.wired_rx_packets, &base);
            b.add(&self.tx_bytes, c.wired_tx_bytes, &base);
            b.add(&self.tx_bytes_r, c.wired_tx_bytes_r, &base);
            b.add(&self.tx_packets, c.wired_tx_packets, &base);
        } else {
            b.add(&self.anomalies, c.anomalies, &radio);
            b.add(&self.ccq, ratio(c.ccq, 1000.0), &radio);
            b.add(&self.satisfaction, c.satisfaction.val / 100.0, &radio);
            b.add(&self.noise, c.noise, &radio);
            b.add(&self.roam_count, c.roam_count, &radio);
            b.add(&self.rssi, c.rssi, &radio);
            b.add(&self.signal, c.signal, &radio);
            b.add(&self.tx_power, c.tx_power, &radio);
            b.add(&self.tx_rate, scaled(c.tx_rate, 1000), &radio);
            b.add(&self.wifi_tx_attempts, c.wifi_tx_attempts, &radio);
            b.add(&self.rx_rate, scaled(c.rx_rate, 1000), &radio);
            b.add(&self.tx_retries, c.tx_retries, &base);
            b.add(&self.tx_bytes, c.tx_bytes, &base);
            b.add(&self.tx_bytes_r, c.tx_bytes_r, &base);
            b.add(&self.tx_packets, c.tx_packets, &base);
            b.add(&self.rx_bytes, c.rx_bytes, &base);
            b.add(&self.rx_bytes_r, c.rx_bytes_r, &base);
            b.add(&self.rx_packets, c.rx_packets, &base);
            b.add(&self.bytes_r, c.bytes_r, &radio);
        }
        b.add(&self.uptime, c.uptime, &radio);

        b
    }

    /// One batch per DPI table, accumulating into `totals`.
    pub(crate) fn export_dpi(&self, table: &DpiTable, totals: &mut DpiTotals) -> Batch {
        let mut b = Batch::default();

        for dpi in &table.by_app {
            let category = category_name(dpi.cat.int64());
            let application = application_name(dpi.cat.int64(), dpi.app.int64());
            totals.fill(table, category, dpi);

            let l = labels(&[
                &table.name,
                &table.mac,
                &table.site_name,
                &table.source_name,
                category,
                &application,
            ]);
            self.add_dpi(&mut b, &DpiSum::from(dpi), &l);
        }

        b
    }

    /// The TOTAL series, one per controller, site and category.
    pub(crate) fn export_totals(&self, totals: &DpiTotals) -> Batch {
        let mut b = Batch::default();

        for (controller, sites) in &totals.0 {
            for (site, categories) in sites {
                for (category, sum) in categories {
                    let l = labels(&[TOTAL, TOTAL, site, controller, category, TOTAL]);
                    self.add_dpi(&mut b, sum, &l);
                }
            }
        }

        b
    }

    fn add_dpi(&self, b: &mut Batch, sum: &DpiSum, l: &[String]) {
        b.add(&self.dpi_tx_packets, &sum.tx_packets, l);
        b.add(&self.dpi_rx_packets, &sum.rx_packets, l);
        b.add(&self.dpi_tx_bytes, &sum.tx_bytes, l);
        b.add(&self.dpi_rx_bytes, &sum.rx_bytes, l);
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DpiSum {
    tx_packets: FlexInt,
    rx_packets: FlexInt,
    tx_bytes: FlexInt,
    rx_bytes: FlexInt,
}

impl From<&unpoller_api::DpiApp> for DpiSum {
    fn from(dpi: &unpoller_api::DpiApp) -> Self {
        Self {
            tx_packets: dpi.tx_packets.clone(),
            rx_packets: dpi.rx_packets.clone(),
            tx_bytes: dpi.tx_bytes.clone(),
            rx_bytes: dpi.rx_bytes.clone(),
        }
    }
}

/// Category totals keyed by controller, site and category.
#[derive(Debug, Default)]
pub(crate) struct DpiTotals(BTreeMap<String, BTreeMap<String, BTreeMap<String, DpiSum>>>);

impl DpiTotals {
    fn fill(&mut self, table: &DpiTable, category: &str, dpi: &unpoller_api::DpiApp) {
        let sum = self
            .0
            .entry(table.source_name.clone())
            .or_default()
            .entry(table.site_name.clone())
            .or_default()
            .entry(category.to_owned())
            .or_default();
        sum.tx_packets.add(&dpi.tx_packets);
        sum.rx_packets.add(&dpi.rx_packets);
        sum.tx_bytes.add(&dpi.tx_bytes);
        sum.rx_bytes.add(&dpi.rx_bytes);
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn ratio(v: i64, divisor: f64) -> f64 {
    v as f64 / divisor
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn scaled(v: i64, factor: i64) -> f64 {
    (v as f64) * (factor as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use prometheus::Registry;
    use unpoller_api::{DpiApp, FlexBool};

    use super::*;

    fn descs(registry: &Registry) -> ClientDescs {
        ClientDescs::new(&mut Builder::new(registry, "unifipoller")).unwrap()
    }

    fn values(batch: Batch) -> Vec<(Vec<String>, f64)> {
        batch
            .into_samples()
            .into_iter()
            .map(|s| (s.labels.clone(), s.value.as_f64()))
            .collect()
    }

    #[test]
    fn wired_client_exports_wired_counters_and_uptime() {
        let registry = Registry::new();
        let d = descs(&registry);
        let client = Client {
            mac: "aa:bb".into(),
            is_wired: FlexBool::new(true),
            wired_rx_bytes: 100,
            rx_bytes: 999,
            uptime: 60,
            ..Client::default()
        };

        let out = values(d.export(&client));
        assert_eq!(out.len(), 7);
        assert_eq!(out[0].1, 100.0);
        assert_eq!(out[0].0.last().unwrap(), "true");
        assert_eq!(out[6].1, 60.0);
    }

    #[test]
    fn wireless_client_scales_radio_values() {
        let registry = Registry::new();
        let d = descs(&registry);
        let client = Client {
            ccq: 955,
            satisfaction: FlexInt::new(87.0),
            tx_rate: 866_700,
            radio_description: "ap1 wifi0".into(),
            ..Client::default()
        };

        let out = values(d.export(&client));
        assert_eq!(out.len(), 20);
        assert_eq!(out[1].1, 0.955);
        assert_eq!(out[2].1, 0.87);
        assert_eq!(out[8].1, 866_700_000.0);
        assert_eq!(out[1].0[6], "ap1 wifi0");
        assert_eq!(out[1].0.last().unwrap(), "false");
    }

    #[test]
    fn dpi_totals_sum_per_category() {
        let registry = Registry::new();
        let d = descs(&registry);
        let table = DpiTable {
            mac: "aa:bb".into(),
            site_name: "Home (default)".into(),
            source_name: "https://ctrl".into(),
            by_app: vec![
                DpiApp {
                    cat: FlexInt::new(1.0),
                    app: FlexInt::new(5.0),
                    tx_bytes: FlexInt::new(10.0),
                    ..DpiApp::default()
                },
                DpiApp {
                    cat: FlexInt::new(1.0),
                    app: FlexInt::new(7.0),
                    tx_bytes: FlexInt::new(30.0),
                    ..DpiApp::default()
                },
            ],
            ..DpiTable::default()
        };

        let mut totals = DpiTotals::default();
        assert_eq!(d.export_dpi(&table, &mut totals).into_samples().len(), 8);

        let out = values(d.export_totals(&totals));
        assert_eq!(out.len(), 4);
        assert_eq!(
            out[2].0,
            vec!["TOTAL", "TOTAL", "Home (default)", "https://ctrl", "P2P", "TOTAL"]
        );
        assert_eq!(out[2].1, 40.0);
    }
}
