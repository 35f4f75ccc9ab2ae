// Site health and site DPI metrics

use prometheus::Result;

use unpoller_api::dpi::{application_name, category_name};
use unpoller_api::{DpiTable, Site};

use crate::export::{Batch, Builder, Desc, labels};

const LABELS: &[&str] = &["subsystem", "status", "site_name", "source"];
const LABELS_DPI: &[&str] = &["category", "application", "site_name", "source"];

pub(crate) struct SiteDescs {
    num_user: Desc,
    num_guest: Desc,
    num_iot: Desc,
    tx_bytes_r: Desc,
    rx_bytes_r: Desc,
    num_ap: Desc,
    num_adopted: Desc,
    num_disabled: Desc,
    num_disconnected: Desc,
    num_pending: Desc,
    num_gw: Desc,
    num_sw: Desc,
    num_sta: Desc,
    latency: Desc,
    uptime: Desc,
    drops: Desc,
    xput_up: Desc,
    xput_down: Desc,
    speedtest_ping: Desc,
    remote_user_active: Desc,
    remote_user_inactive: Desc,
    remote_user_rx_bytes: Desc,
    remote_user_tx_bytes: Desc,
    remote_user_rx_packets: Desc,
    remote_user_tx_packets: Desc,
    dpi_tx_packets: Desc,
    dpi_rx_packets: Desc,
    dpi_tx_bytes: Desc,
    dpi_rx_bytes: Desc,
}

impl SiteDescs {
    pub(crate) fn new(b: &mut Builder<'_>) -> Result<Self> {
        b.subsystem("site");
        let l = LABELS;

        Ok(Self {
            num_user: b.gauge("users", "Number of Users on Site", l)?,
            num_guest: b.gauge("guests", "Number of Guests on Site", l)?,
            num_iot: b.gauge("iots", "Number of IoT Devices on Site", l)?,
            tx_bytes_r: b.gauge("transmit_rate_bytes", "Bytes Transmit Rate", l)?,
            rx_bytes_r: b.gauge("receive_rate_bytes", "Bytes Receive Rate", l)?,
            num_ap: b.gauge("aps", "Access Point Count", l)?,
            num_adopted: b.gauge("adopted", "Adoption Count", l)?,
            num_disabled: b.gauge("disabled", "Disabled Count", l)?,
            num_disconnected: b.gauge("disconnected", "Disconnected Count", l)?,
            num_pending: b.gauge("pending", "Pending Count", l)?,
            num_gw: b.gauge("gateways", "Gateway Count", l)?,
            num_sw: b.gauge("switches", "Switch Count", l)?,
            num_sta: b.gauge("stations", "Station Count", l)?,
            latency: b.gauge("latency_seconds", "Latency", l)?,
            uptime: b.gauge("uptime_seconds", "Uptime", l)?,
            drops: b.counter("intenet_drops_total", "Internet (WAN) Disconnections", l)?,
            xput_up: b.gauge("xput_up_rate", "Speedtest Upload", l)?,
            xput_down: b.gauge("xput_down_rate", "Speedtest Download", l)?,
            speedtest_ping: b.gauge("speedtest_ping", "Speedtest Ping", l)?,
            remote_user_active: b.gauge("remote_user_active", "Remote Users Active", l)?,
            remote_user_inactive: b.gauge("remote_user_inactive", "Remote Users Inactive", l)?,
            remote_user_rx_bytes: b.counter(
                "remote_user_receive_bytes_total",
                "Remote Users Receive Bytes",
                l,
            )?,
            remote_user_tx_bytes: b.counter(
                "remote_user_transmit_bytes_total",
                "Remote Users Transmit Bytes",
                l,
            )?,
            remote_user_rx_packets: b.counter(
                "remote_user_receive_packets_total",
                "Remote Users Receive Packets",
                l,
            )?,
            remote_user_tx_packets: b.counter(
                "remote_user_transmit_packets_total",
                "Remote Users Transmit Packets",
                l,
            )?,
            dpi_tx_packets: b.counter("dpi_transmit_packets", "Site DPI Transmit Packets", LABELS_DPI)?,
            dpi_rx_packets: b.counter("dpi_receive_packets", "Site DPI Receive Packets", LABELS_DPI)?,
            dpi_tx_bytes: b.counter("dpi_transmit_bytes", "Site DPI Transmit Bytes", LABELS_DPI)?,
            dpi_rx_bytes: b.counter("dpi_receive_bytes", "Site DPI Receive Bytes", LABELS_DPI)?,
        })
    }

    /// One label set per health subsystem; unknown subsystems export nothing.
    pub(crate) fn export(&self, s: &Site) -> Batch {
        let mut b = Batch::default();

        for h in &s.health {
            let l = labels(&[&h.subsystem, &h.status, &s.site_name, &s.source_name]);

            match h.subsystem.as_str() {
                "www" => {
                    b.add(&self.tx_bytes_r, &h.tx_bytes_r, &l);
                    b.add(&self.rx_bytes_r, &h.rx_bytes_r, &l);
                    b.add(&self.uptime, &h.uptime, &l);
                    b.add(&self.latency, h.latency.val / 1000.0, &l);
                    b.add(&self.xput_up, &h.xput_up, &l);
                    b.add(&self.xput_down, &h.xput_down, &l);
                    b.add(&self.speedtest_ping, &h.speedtest_ping, &l);
                    b.add(&self.drops, &h.drops, &l);
                }
                "wlan" => {
                    b.add(&self.tx_bytes_r, &h.tx_bytes_r, &l);
                    b.add(&self.rx_bytes_r, &h.rx_bytes_r, &l);
                    b.add(&self.num_adopted, &h.num_adopted, &l);
                    b.add(&self.num_disconnected, &h.num_disconnected, &l);
                    b.add(&self.num_pending, &h.num_pending, &l);
                    b.add(&self.num_user, &h.num_user, &l);
                    b.add(&self.num_guest, &h.num_guest, &l);
                    b.add(&self.num_iot, &h.num_iot, &l);
                    b.add(&self.num_ap, &h.num_ap, &l);
                    b.add(&self.num_disabled, &h.num_disabled, &l);
                }
                "wan" => {
                    b.add(&self.tx_bytes_r, &h.tx_bytes_r, &l);
                    b.add(&self.rx_bytes_r, &h.rx_bytes_r, &l);
                    b.add(&self.num_adopted, &h.num_adopted, &l);
                    b.add(&self.num_disconnected, &h.num_disconnected, &l);
                    b.add(&self.num_pending, &h.num_pending, &l);
                    b.add(&self.num_gw, &h.num_gw, &l);
                    b.add(&self.num_sta, &h.num_sta, &l);
                }
                "lan" => {
                    b.add(&self.tx_bytes_r, &h.tx_bytes_r, &l);
                    b.add(&self.rx_bytes_r, &h.rx_bytes_r, &l);
                    b.add(&self.num_adopted, &h.num_adopted, &l);
                    b.add(&self.num_disconnected, &h.num_disconnected, &l);
                    b.add(&self.num_pending, &h.num_pending, &l);
                    b.add(&self.num_user, &h.num_user, &l);
                    b.add(&self.num_guest, &h.num_guest, &l);
                    b.add(&self.num_iot, &h.num_iot, &l);
                    b.add(&self.num_sw, &h.num_sw, &l);
                }
                "vpn" => {
                    b.add(&self.remote_user_active, &h.remote_user_num_active, &l);
                    b.add(&self.remote_user_inactive, &h.remote_user_num_inactive, &l);
                    b.add(&self.remote_user_rx_bytes, &h.remote_user_rx_bytes, &l);
                    b.add(&self.remote_user_tx_bytes, &h.remote_user_tx_bytes, &l);
                    b.add(&self.remote_user_rx_packets, &h.remote_user_rx_packets, &l);
                    b.add(&self.remote_user_tx_packets, &h.remote_user_tx_packets, &l);
                }
                _ => {}
            }
        }

        b
    }

    pub(crate) fn export_dpi(&self, table: &DpiTable) -> Batch {
        let mut b = Batch::default();

        for dpi in &table.by_app {
            let category = category_name(dpi.cat.int64());
            let application = application_name(dpi.cat.int64(), dpi.app.int64());
            let l = labels(&[category, &application, &table.site_name, &table.source_name]);

            b.add(&self.dpi_tx_packets, &dpi.tx_packets, &l);
            b.add(&self.dpi_rx_packets, &dpi.rx_packets, &l);
            b.add(&self.dpi_tx_bytes, &dpi.tx_bytes, &l);
            b.add(&self.dpi_rx_bytes, &dpi.rx_bytes, &l);
        }

        b
    }
}
