// Switch metrics: aggregate switch counters and the port table

use prometheus::Result;

use unpoller_api::models::Port;
use unpoller_api::{DeviceStat, Usw};

use crate::descs::Descs;
use crate::device::{device_labels, skip};
use crate::export::{Batch, Builder, Desc, labels};

const LABELS_SWITCH: &[&str] = &["site_name", "name", "source"];
const LABELS_PORT: &[&str] = &[
    "port_id", "port_num", "port_name", "port_mac", "port_ip", "site_name", "name", "source",
];

/// `stat` keys read for the switch totals.
const SWITCH_KEYS: &[(&str, &str, &str)] = &[
    ("rx_packets", "switch_receive_packets_total", "Switch Packets Received Total"),
    ("rx_bytes", "switch_receive_bytes_total", "Switch Bytes Received Total"),
    ("rx_errors", "switch_receive_errors_total", "Switch Errors Received Total"),
    ("rx_dropped", "switch_receive_dropped_total", "Switch Dropped Received Total"),
    ("rx_crypts", "switch_receive_crypts_total", "Switch Crypts Received Total"),
    ("rx_frags", "switch_receive_frags_total", "Switch Frags Received Total"),
    ("tx_packets", "switch_transmit_packets_total", "Switch Packets Transmit Total"),
    ("tx_bytes", "switch_transmit_bytes_total", "Switch Bytes Transmit Total"),
    ("tx_errors", "switch_transmit_errors_total", "Switch Errors Transmit Total"),
    ("tx_dropped", "switch_transmit_dropped_total", "Switch Dropped Transmit Total"),
    ("tx_retries", "switch_transmit_retries_total", "Switch Retries Transmit Total"),
    ("rx_multicast", "switch_receive_multicast_total", "Switch Multicast Receive Total"),
    ("rx_broadcast", "switch_receive_broadcast_total", "Switch Broadcast Receive Total"),
    ("tx_multicast", "switch_transmit_multicast_total", "Switch Multicast Transmit Total"),
    ("tx_broadcast", "switch_transmit_broadcast_total", "Switch Broadcast Transmit Total"),
    ("bytes", "switch_bytes_total", "Switch Bytes Transferred Total"),
];

pub(crate) struct UswDescs {
    switch: Vec<(&'static str, Desc)>,

    poe_current: Desc,
    poe_power: Desc,
    poe_voltage: Desc,
    rx_broadcast: Desc,
    rx_bytes: Desc,
    rx_bytes_r: Desc,
    rx_dropped: Desc,
    rx_errors: Desc,
    rx_multicast: Desc,
    rx_packets: Desc,
    satisfaction: Desc,
    speed: Desc,
    tx_broadcast: Desc,
    tx_bytes: Desc,
    tx_bytes_r: Desc,
    tx_dropped: Desc,
    tx_errors: Desc,
    tx_multicast: Desc,
    tx_packets: Desc,
}

impl UswDescs {
    pub(crate) fn new(b: &mut Builder<'_>) -> Result<Self> {
        b.subsystem("device");
        let p = LABELS_PORT;

        let mut switch = Vec::with_capacity(SWITCH_KEYS.len());
        for (key, name, help) in SWITCH_KEYS {
            switch.push((*key, b.counter(name, help, LABELS_SWITCH)?));
        }

        Ok(Self {
            switch,

            poe_current: b.gauge("port_poe_amperes", "POE Current", p)?,
            poe_power: b.gauge("port_poe_watts", "POE Power", p)?,
            poe_voltage: b.gauge("port_poe_volts", "POE Voltage", p)?,
            rx_broadcast: b.counter("port_receive_broadcast_total", "Receive Broadcast", p)?,
            rx_bytes: b.counter("port_receive_bytes_total", "Total Receive Bytes", p)?,
            rx_bytes_r: b.gauge("port_receive_rate_bytes", "Receive Bytes Rate", p)?,
            rx_dropped: b.counter("port_receive_dropped_total", "Total Receive Dropped", p)?,
            rx_errors: b.counter("port_receive_errors_total", "Total Receive Errors", p)?,
            rx_multicast: b.counter("port_receive_multicast_total", "Total Receive Multicast", p)?,
            rx_packets: b.counter("port_receive_packets_total", "Total Receive Packets", p)?,
            satisfaction: b.gauge("port_satisfaction_ratio", "Satisfaction", p)?,
            speed: b.gauge("port_port_speed_bps", "Speed", p)?,
            tx_broadcast: b.counter("port_transmit_broadcast_total", "Total Transmit Broadcast", p)?,
            tx_bytes: b.counter("port_transmit_bytes_total", "Total Transmit Bytes", p)?,
            tx_bytes_r: b.gauge("port_transmit_rate_bytes", "Transmit Bytes Rate", p)?,
            tx_dropped: b.counter("port_transmit_dropped_total", "Total Transmit Dropped", p)?,
            tx_errors: b.counter("port_transmit_errors_total", "Total Transmit Errors", p)?,
            tx_multicast: b.counter("port_transmit_multicast_total", "Total Transmit Multicast", p)?,
            tx_packets: b.counter("port_transmit_packets_total", "Total Transmit Packets", p)?,
        })
    }

    /// Switch totals; nothing when the controller sent no `stat`.
    pub(crate) fn export_stats(&self, b: &mut Batch, stat: &DeviceStat, l: &[String]) {
        if stat.is_empty() {
            return;
        }

        let ls = &l[1..];
        for (key, desc) in &self.switch {
            b.add(desc, stat.get(key), ls);
        }
    }

    /// Ports that are up and enabled. PoE values only where PoE is on.
    pub(crate) fn export_ports(&self, b: &mut Batch, ports: &[Port], l: &[String]) {
        for p in ports.iter().filter(|p| p.up.val && p.enable.val) {
            let id = format!("{} Port {}", l[2], p.port_idx.txt);
            let lp = labels(&[&id, &p.port_idx.txt, &p.name, &p.mac, &p.ip, &l[1], &l[2], &l[3]]);

            if p.poe_enable.val && p.port_poe.val {
                b.add(&self.poe_current, &p.poe_current, &lp);
                b.add(&self.poe_power, &p.poe_power, &lp);
                b.add(&self.poe_voltage, &p.poe_voltage, &lp);
            }

            b.add(&self.rx_broadcast, &p.rx_broadcast, &lp);
            b.add(&self.rx_bytes, &p.rx_bytes, &lp);
            b.add(&self.rx_bytes_r, &p.rx_bytes_r, &lp);
            b.add(&self.rx_dropped, &p.rx_dropped, &lp);
            b.add(&self.rx_errors, &p.rx_errors, &lp);
            b.add(&self.rx_multicast, &p.rx_multicast, &lp);
            b.add(&self.rx_packets, &p.rx_packets, &lp);
            b.add(&self.satisfaction, p.satisfaction.val / 100.0, &lp);
            b.add(&self.speed, p.speed.val * 1_000_000.0, &lp);
            b.add(&self.tx_broadcast, &p.tx_broadcast, &lp);
            b.add(&self.tx_bytes, &p.tx_bytes, &lp);
            b.add(&self.tx_bytes_r, &p.tx_bytes_r, &lp);
            b.add(&self.tx_dropped, &p.tx_dropped, &lp);
            b.add(&self.tx_errors, &p.tx_errors, &lp);
            b.add(&self.tx_multicast, &p.tx_multicast, &lp);
            b.add(&self.tx_packets, &p.tx_packets, &lp);
        }
    }
}

pub(crate) fn export_usw(descs: &Descs, s: &Usw) -> Batch {
    let d = &s.common;
    let mut b = Batch::default();
    if skip(d) {
        return b;
    }

    let l = device_labels(d);
    let dev = &descs.device;

    descs.usw.export_stats(&mut b, &d.stat, &l);
    descs.usw.export_ports(&mut b, &s.port_table, &l);
    dev.export_bytes(&mut b, d, &l);
    dev.export_sys(&mut b, d, &l);
    dev.export_stations(&mut b, &l, &[("user", &d.user_num_sta), ("guest", &d.guest_num_sta)]);
    dev.export_info(&mut b, d, &l);
    dev.export_temperature(&mut b, &l, &s.has_temperature, &s.general_temperature);
    dev.export_fan(&mut b, &l, &s.has_fan, &s.fan_level);
    dev.export_max_power(&mut b, &l, &s.total_max_power);

    b
}
