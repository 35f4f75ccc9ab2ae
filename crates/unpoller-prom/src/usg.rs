// Gateway metrics: WAN ports, LAN totals, uplink and speed test

use prometheus::Result;

use unpoller_api::models::{SpeedtestStatus, Uplink, Wan};
use unpoller_api::{DeviceStat, Usg};

use crate::descs::Descs;
use crate::device::{device_labels, skip};
use crate::export::{Batch, Builder, Desc, labels};

const LABELS: &[&str] = &["port", "site_name", "name", "source"];

pub(crate) struct UsgDescs {
    wan_rx_packets: Desc,
    wan_rx_bytes: Desc,
    wan_rx_dropped: Desc,
    wan_rx_errors: Desc,
    wan_tx_packets: Desc,
    wan_tx_bytes: Desc,
    wan_rx_broadcast: Desc,
    wan_rx_bytes_r: Desc,
    wan_rx_multicast: Desc,
    wan_speed: Desc,
    wan_tx_broadcast: Desc,
    wan_tx_bytes_r: Desc,
    wan_tx_dropped: Desc,
    wan_tx_errors: Desc,
    wan_tx_multicast: Desc,
    wan_bytes_r: Desc,
    lan_rx_packets: Desc,
    lan_rx_bytes: Desc,
    lan_rx_dropped: Desc,
    lan_tx_packets: Desc,
    lan_tx_bytes: Desc,
    latency: Desc,
    uplink_latency: Desc,
    uplink_speed: Desc,
    runtime: Desc,
    xput_download: Desc,
    xput_upload: Desc,
}

impl UsgDescs {
    pub(crate) fn new(b: &mut Builder<'_>) -> Result<Self> {
        b.subsystem("device");
        let l = LABELS;

        Ok(Self {
            wan_rx_packets: b.counter("wan_receive_packets_total", "WAN Receive Packets Total", l)?,
            wan_rx_bytes: b.counter("wan_receive_bytes_total", "WAN Receive Bytes Total", l)?,
            wan_rx_dropped: b.counter("wan_receive_dropped_total", "WAN Receive Dropped Total", l)?,
            wan_rx_errors: b.counter("wan_receive_errors_total", "WAN Receive Errors Total", l)?,
            wan_tx_packets: b.counter("wan_transmit_packets_total", "WAN Transmit Packets Total", l)?,
            wan_tx_bytes: b.counter("wan_transmit_bytes_total", "WAN Transmit Bytes Total", l)?,
            wan_rx_broadcast: b.counter("wan_receive_broadcast_total", "WAN Receive Broadcast Total", l)?,
            wan_rx_bytes_r: b.gauge("wan_receive_rate_bytes", "WAN Receive Bytes Rate", l)?,
            wan_rx_multicast: b.counter("wan_receive_multicast_total", "WAN Receive Multicast Total", l)?,
            wan_speed: b.gauge("wan_speed_bps", "WAN Speed", l)?,
            wan_tx_broadcast: b.counter("wan_transmit_broadcast_total", "WAN Transmit Broadcast Total", l)?,
            wan_tx_bytes_r: b.gauge("wan_transmit_rate_bytes", "WAN Transmit Bytes Rate", l)?,
            wan_tx_dropped: b.counter("wan_transmit_dropped_total", "WAN Transmit Dropped Total", l)?,
            wan_tx_errors: b.counter("wan_transmit_errors_total", "WAN Transmit Errors Total", l)?,
            wan_tx_multicast: b.counter("wan_transmit_multicast_total", "WAN Transmit Multicast Total", l)?,
            wan_bytes_r: b.gauge("wan_rate_bytes", "WAN Transfer Rate", l)?,
            lan_rx_packets: b.counter("lan_receive_packets_total", "LAN Receive Packets Total", l)?,
            lan_rx_bytes: b.counter("lan_receive_bytes_total", "LAN Receive Bytes Total", l)?,
            lan_rx_dropped: b.counter("lan_receive_dropped_total", "LAN Receive Dropped Total", l)?,
            lan_tx_packets: b.counter("lan_transmit_packets_total", "LAN Transmit Packets Total", l)?,
            lan_tx_bytes: b.counter("lan_transmit_bytes_total", "LAN Transmit Bytes Total", l)?,
            latency: b.gauge("speedtest_latency_seconds", "Speedtest Latency", l)?,
            uplink_latency: b.gauge("uplink_latency_seconds", "Uplink Latency", l)?,
            uplink_speed: b.gauge("uplink_speed_mbps", "Uplink Speed", l)?,
            runtime: b.gauge("speedtest_runtime", "Speedtest Run Time", l)?,
            xput_download: b.gauge("speedtest_download", "Speedtest Download Rate", l)?,
            xput_upload: b.gauge("speedtest_upload", "Speedtest Upload Rate", l)?,
        })
    }

    /// Only WAN interfaces that are up; speed is reported in bits per second.
    pub(crate) fn export_wans(&self, b: &mut Batch, wans: &[&Wan], l: &[String]) {
        for wan in wans.iter().filter(|w| w.up.val) {
            let lw = labels(&[&wan.name, &l[1], &l[2], &l[3]]);

            b.add(&self.wan_rx_packets, &wan.rx_packets, &lw);
            b.add(&self.wan_rx_bytes, &wan.rx_bytes, &lw);
            b.add(&self.wan_rx_dropped, &wan.rx_dropped, &lw);
            b.add(&self.wan_rx_errors, &wan.rx_errors, &lw);
            b.add(&self.wan_tx_packets, &wan.tx_packets, &lw);
            b.add(&self.wan_tx_bytes, &wan.tx_bytes, &lw);
            b.add(&self.wan_rx_broadcast, &wan.rx_broadcast, &lw);
            b.add(&self.wan_rx_multicast, &wan.rx_multicast, &lw);
            b.add(&self.wan_speed, wan.speed.val * 1_000_000.0, &lw);
            b.add(&self.wan_tx_broadcast, &wan.tx_broadcast, &lw);
            b.add(&self.wan_rx_bytes_r, &wan.rx_bytes_r, &lw);
            b.add(&self.wan_tx_bytes_r, &wan.tx_bytes_r, &lw);
            b.add(&self.wan_tx_dropped, &wan.tx_dropped, &lw);
            b.add(&self.wan_tx_errors, &wan.tx_errors, &lw);
            b.add(&self.wan_tx_multicast, &wan.tx_multicast, &lw);
            b.add(&self.wan_bytes_r, &wan.bytes_r, &lw);
        }
    }

    /// LAN totals from `stat`, then uplink and speed test under `port="all"`.
    pub(crate) fn export_stats(
        &self,
        b: &mut Batch,
        stat: &DeviceStat,
        speedtest: &SpeedtestStatus,
        uplink: &Uplink,
        l: &[String],
    ) {
        if stat.is_empty() {
            return;
        }

        let lan = labels(&["lan", &l[1], &l[2], &l[3]]);
        let all = labels(&["all", &l[1], &l[2], &l[3]]);

        b.add(&self.lan_rx_packets, stat.get("lan-rx_packets"), &lan);
        b.add(&self.lan_rx_bytes, stat.get("lan-rx_bytes"), &lan);
        b.add(&self.lan_tx_packets, stat.get("lan-tx_packets"), &lan);
        b.add(&self.lan_tx_bytes, stat.get("lan-tx_bytes"), &lan);
        b.add(&self.lan_rx_dropped, stat.get("lan-rx_dropped"), &lan);
        b.add(&self.uplink_latency, uplink.latency.val / 1000.0, &all);
        b.add(&self.uplink_speed, &uplink.speed, &all);
        b.add(&self.latency, speedtest.latency.val / 1000.0, &all);
        b.add(&self.runtime, &speedtest.runtime, &all);
        b.add(&self.xput_download, &speedtest.xput_download, &all);
        b.add(&self.xput_upload, &speedtest.xput_upload, &all);
    }
}

pub(crate) fn export_usg(descs: &Descs, s: &Usg) -> Batch {
    let d = &s.common;
    let mut b = Batch::default();
    if skip(d) {
        return b;
    }

    let l = device_labels(d);
    let dev = &descs.device;

    descs.usg.export_wans(&mut b, &[&s.wan1, &s.wan2], &l);
    dev.export_bytes(&mut b, d, &l);
    dev.export_sys(&mut b, d, &l);
    descs.usg.export_stats(&mut b, &d.stat, &s.speedtest_status, &s.uplink, &l);
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
    dev.export_temperature(&mut b, &l, &s.has_temperature, &s.general_temperature);
    dev.export_info(&mut b, d, &l);

    b
}
