// Access point metrics: per-AP stats, VAPs and radios

use prometheus::Result;

use unpoller_api::models::{RadioEntry, RadioStats, Vap};
use unpoller_api::{DeviceStat, Uap};

use crate::descs::Descs;
use crate::device::{device_labels, skip};
use crate::export::{Batch, Builder, Desc, labels, with};

const LABELS_STAT: &[&str] = &["stat", "site_name", "name", "source"];
const LABELS_VAP: &[&str] = &[
    "vap_name", "bssid", "radio", "radio_name", "essid", "usage", "site_name", "name", "source",
];
const LABELS_RADIO: &[&str] = &["radio_name", "radio", "site_name", "name", "source"];

/// `stat` keys exported per station type, as `user-<key>` and `guest-<key>`.
const STAT_KEYS: &[(&str, &str, &str)] = &[
    ("wifi_tx_dropped", "stat_wifi_transmt_dropped_total", "Wifi Transmissions Dropped"),
    ("rx_errors", "stat_receive_errors_total", "Receive Errors"),
    ("rx_dropped", "stat_receive_dropped_total", "Receive Dropped"),
    ("rx_frags", "stat_receive_frags_total", "Received Frags"),
    ("rx_crypts", "stat_receive_crypts_total", "Receive Crypts"),
    ("tx_packets", "stat_transmit_packets_total", "Transmit Packets"),
    ("tx_bytes", "stat_transmit_bytes_total", "Transmit Bytes"),
    ("tx_errors", "stat_transmit_errors_total", "Transmit Errors"),
    ("tx_dropped", "stat_transmit_dropped_total", "Transmit Dropped"),
    ("tx_retries", "stat_retries_tx_total", "Transmit Retries"),
    ("rx_packets", "stat_receive_packets_total", "Receive Packets"),
    ("rx_bytes", "stat_receive_bytes_total", "Receive Bytes"),
    ("wifi_tx_attempts", "stat_wifi_transmit_attempts_total", "Wifi Transmission Attempts"),
    ("mac_filter_rejections", "stat_mac_filter_rejects_total", "MAC Filter Rejections"),
];

pub(crate) struct UapDescs {
    stat: Vec<(&'static str, Desc)>,

    vap_ccq: Desc,
    vap_mac_filter_rejections: Desc,
    vap_num_satisfaction_sta: Desc,
    vap_avg_client_signal: Desc,
    vap_satisfaction: Desc,
    vap_satisfaction_now: Desc,
    vap_dns_avg_latency: Desc,
    vap_rx_bytes: Desc,
    vap_rx_crypts: Desc,
    vap_rx_dropped: Desc,
    vap_rx_errors: Desc,
    vap_rx_frags: Desc,
    vap_rx_nwids: Desc,
    vap_rx_packets: Desc,
    vap_tx_bytes: Desc,
    vap_tx_dropped: Desc,
    vap_tx_errors: Desc,
    vap_tx_packets: Desc,
    vap_tx_power: Desc,
    vap_tx_retries: Desc,
    vap_tx_combined_retries: Desc,
    vap_tx_data_mpdu_bytes: Desc,
    vap_tx_rts_retries: Desc,
    vap_tx_success: Desc,
    vap_tx_total: Desc,
    vap_tx_goodbytes: Desc,
    vap_tx_lat_avg: Desc,
    vap_tx_lat_max: Desc,
    vap_tx_lat_min: Desc,
    vap_rx_goodbytes: Desc,
    vap_rx_lat_avg: Desc,
    vap_rx_lat_max: Desc,
    vap_rx_lat_min: Desc,
    vap_tx_latency_mov_avg: Desc,
    vap_tx_latency_mov_max: Desc,
    vap_tx_latency_mov_min: Desc,
    vap_tx_latency_mov_total: Desc,
    vap_tx_latency_mov_count: Desc,

    radio_current_antenna_gain: Desc,
    radio_ht: Desc,
    radio_max_tx_power: Desc,
    radio_min_tx_power: Desc,
    radio_nss: Desc,
    radio_caps: Desc,
    radio_tx_power: Desc,
    radio_ast_be_xmit: Desc,
    radio_channel: Desc,
    radio_cu_self_rx: Desc,
    radio_cu_self_tx: Desc,
    radio_cu_total: Desc,
    radio_ext_channel: Desc,
    radio_gain: Desc,
    radio_num_sta: Desc,
    radio_tx_packets: Desc,
    radio_tx_retries: Desc,
}

impl UapDescs {
    pub(crate) fn new(b: &mut Builder<'_>) -> Result<Self> {
        b.subsystem("device");
        let v = LABELS_VAP;
        let r = LABELS_RADIO;
        let radio_sta: Vec<&str> = LABELS_RADIO.iter().chain(&["station_type"]).copied().collect();

        let mut stat = Vec::with_capacity(STAT_KEYS.len());
        for (key, name, help) in STAT_KEYS {
            stat.push((*key, b.counter(name, help, LABELS_STAT)?));
        }

        Ok(Self {
            stat,

            vap_ccq: b.gauge("vap_ccq_ratio", "VAP Client Connection Quality", v)?,
            vap_mac_filter_rejections: b.counter("vap_mac_filter_rejects_total", "VAP MAC Filter Rejections", v)?,
            vap_num_satisfaction_sta: b.gauge("vap_satisfaction_stations", "VAP Number Satisifaction Stations", v)?,
            vap_avg_client_signal: b.gauge("vap_average_client_signal", "VAP Average Client Signal", v)?,
            vap_satisfaction: b.gauge("vap_satisfaction_ratio", "VAP Satisfaction", v)?,
            vap_satisfaction_now: b.gauge("vap_satisfaction_now_ratio", "VAP Satisfaction Now", v)?,
            vap_dns_avg_latency: b.gauge("vap_dns_latency_average_seconds", "VAP DNS Latency Average", v)?,
            vap_rx_bytes: b.counter("vap_receive_bytes_total", "VAP Bytes Received", v)?,
            vap_rx_crypts: b.counter("vap_receive_crypts_total", "VAP Crypts Received", v)?,
            vap_rx_dropped: b.counter("vap_receive_dropped_total", "VAP Dropped Received", v)?,
            vap_rx_errors: b.counter("vap_receive_errors_total", "VAP Errors Received", v)?,
            vap_rx_frags: b.counter("vap_receive_frags_total", "VAP Frags Received", v)?,
            vap_rx_nwids: b.counter("vap_receive_nwids_total", "VAP Nwids Received", v)?,
            vap_rx_packets: b.counter("vap_receive_packets_total", "VAP Packets Received", v)?,
            vap_tx_bytes: b.counter("vap_transmit_bytes_total", "VAP Bytes Transmitted", v)?,
            vap_tx_dropped: b.counter("vap_transmit_dropped_total", "VAP Dropped Transmitted", v)?,
            vap_tx_errors: b.counter("vap_transmit_errors_total", "VAP Errors Transmitted", v)?,
            vap_tx_packets: b.counter("vap_transmit_packets_total", "VAP Packets Transmitted", v)?,
            vap_tx_power: b.gauge("vap_transmit_power", "VAP Transmit Power", v)?,
            vap_tx_retries: b.counter("vap_transmit_retries_total", "VAP Retries Transmitted", v)?,
            vap_tx_combined_retries: b.counter("vap_transmit_retries_combined_total", "VAP Retries Combined Tx", v)?,
            vap_tx_data_mpdu_bytes: b.counter("vap_data_mpdu_transmit_bytes_total", "VAP Data MPDU Bytes Tx", v)?,
            vap_tx_rts_retries: b.counter("vap_transmit_rts_retries_total", "VAP RTS Retries Transmitted", v)?,
            vap_tx_success: b.counter("vap_transmit_success_total", "VAP Success Transmits", v)?,
            vap_tx_total: b.counter("vap_transmit_total", "VAP Transmit Total", v)?,
            vap_tx_goodbytes: b.counter("vap_transmit_goodbyes", "VAP Goodbyes Transmitted", v)?,
            vap_tx_lat_avg: b.gauge("vap_transmit_latency_average_seconds", "VAP Latency Average Tx", v)?,
            vap_tx_lat_max: b.gauge("vap_transmit_latency_maximum_seconds", "VAP Latency Maximum Tx", v)?,
            vap_tx_lat_min: b.gauge("vap_transmit_latency_minimum_seconds", "VAP Latency Minimum Tx", v)?,
            vap_rx_goodbytes: b.counter("vap_receive_goodbyes", "VAP Goodbyes Received", v)?,
            vap_rx_lat_avg: b.gauge("vap_receive_latency_average_seconds", "VAP Latency Average Rx", v)?,
            vap_rx_lat_max: b.gauge("vap_receive_latency_maximum_seconds", "VAP Latency Maximum Rx", v)?,
            vap_rx_lat_min: b.gauge("vap_receive_latency_minimum_seconds", "VAP Latency Minimum Rx", v)?,
            vap_tx_latency_mov_avg: b.gauge("vap_transmit_latency_moving_avg_seconds", "VAP Latency Moving Avg Tx", v)?,
            vap_tx_latency_mov_max: b.gauge("vap_transmit_latency_moving_max_seconds", "VAP Latency Moving Max Tx", v)?,
            vap_tx_latency_mov_min: b.gauge("vap_transmit_latency_moving_min_seconds", "VAP Latency Moving Min Tx", v)?,
            vap_tx_latency_mov_total: b.counter("vap_transmit_latency_moving_total", "VAP Latency Moving Total Transmit", v)?,
            vap_tx_latency_mov_count: b.counter("vap_transmit_latency_moving_count", "VAP Latency Moving Count Transmit", v)?,

            radio_current_antenna_gain: b.gauge("radio_current_antenna_gain", "Radio Current Antenna Gain", r)?,
            radio_ht: b.gauge("radio_ht", "Radio HT", r)?,
            radio_max_tx_power: b.gauge("radio_max_transmit_power", "Radio Maximum Transmit Power", r)?,
            radio_min_tx_power: b.gauge("radio_min_transmit_power", "Radio Minimum Transmit Power", r)?,
            radio_nss: b.gauge("radio_nss", "Radio Nss", r)?,
            radio_caps: b.gauge("radio_caps", "Radio Capabilities", r)?,
            radio_tx_power: b.gauge("radio_transmit_power", "Radio Transmit Power", r)?,
            radio_ast_be_xmit: b.gauge("radio_ast_be_xmit", "Radio AstBe Transmit", r)?,
            radio_channel: b.gauge("radio_channel", "Radio Channel", r)?,
            radio_cu_self_rx: b.gauge("radio_channel_utilization_receive_ratio", "Channel Utilization Rx", r)?,
            radio_cu_self_tx: b.gauge("radio_channel_utilization_transmit_ratio", "Channel Utilization Tx", r)?,
            radio_cu_total: b.gauge("radio_channel_utilization_total_ratio", "Channel Utilization Total", r)?,
            radio_ext_channel: b.gauge("radio_ext_channel", "Radio Ext Channel", r)?,
            radio_gain: b.gauge("radio_gain", "Radio Gain", r)?,
            radio_num_sta: b.gauge("radio_stations", "Radio Total Station Count", &radio_sta)?,
            radio_tx_packets: b.gauge("radio_transmit_packets", "Radio Transmitted Packets", r)?,
            radio_tx_retries: b.gauge("radio_transmit_retries", "Radio Transmit Retries", r)?,
        })
    }

    /// Per station type AP counters; nothing when the controller sent no `stat`.
    pub(crate) fn export_stats(&self, b: &mut Batch, stat: &DeviceStat, l: &[String]) {
        if stat.is_empty() {
            return;
        }

        for kind in ["user", "guest"] {
            let labels = with(&[kind.to_owned()], &[&l[1], &l[2], &l[3]]);
            for (key, desc) in &self.stat {
                b.add(desc, stat.get(&format!("{kind}-{key}")), &labels);
            }
        }
    }

    /// Only VAPs that are up.
    pub(crate) fn export_vaps(&self, b: &mut Batch, vaps: &[Vap], l: &[String]) {
        for v in vaps.iter().filter(|v| v.up.val) {
            let lv = labels(&[
                &v.name, &v.bssid, &v.radio, &v.radio_name, &v.essid, &v.usage, &l[1], &l[2], &l[3],
            ]);

            b.add(&self.vap_ccq, v.ccq.val / 1000.0, &lv);
            b.add(&self.vap_mac_filter_rejections, &v.mac_filter_rejections, &lv);
            b.add(&self.vap_num_satisfaction_sta, &v.num_satisfaction_sta, &lv);
            b.add(&self.vap_avg_client_signal, &v.avg_client_signal, &lv);
            b.add(&self.vap_satisfaction, v.satisfaction.val / 100.0, &lv);
            b.add(&self.vap_satisfaction_now, v.satisfaction_now.val / 100.0, &lv);
            b.add(&self.vap_dns_avg_latency, v.dns_avg_latency.val / 1000.0, &lv);
            b.add(&self.vap_rx_bytes, &v.rx_bytes, &lv);
            b.add(&self.vap_rx_crypts, &v.rx_crypts, &lv);
            b.add(&self.vap_rx_dropped, &v.rx_dropped, &lv);
            b.add(&self.vap_rx_errors, &v.rx_errors, &lv);
            b.add(&self.vap_rx_frags, &v.rx_frags, &lv);
            b.add(&self.vap_rx_nwids, &v.rx_nwids, &lv);
            b.add(&self.vap_rx_packets, &v.rx_packets, &lv);
            b.add(&self.vap_tx_bytes, &v.tx_bytes, &lv);
            b.add(&self.vap_tx_dropped, &v.tx_dropped, &lv);
            b.add(&self.vap_tx_errors, &v.tx_errors, &lv);
            b.add(&self.vap_tx_packets, &v.tx_packets, &lv);
            b.add(&self.vap_tx_power, &v.tx_power, &lv);
            b.add(&self.vap_tx_retries, &v.tx_retries, &lv);
            b.add(&self.vap_tx_combined_retries, &v.tx_combined_retries, &lv);
            b.add(&self.vap_tx_data_mpdu_bytes, &v.tx_data_mpdu_bytes, &lv);
            b.add(&self.vap_tx_rts_retries, &v.tx_rts_retries, &lv);
            b.add(&self.vap_tx_success, &v.tx_success, &lv);
            b.add(&self.vap_tx_total, &v.tx_total, &lv);
            b.add(&self.vap_tx_goodbytes, &v.tx_tcp_stats.goodbytes, &lv);
            b.add(&self.vap_tx_lat_avg, v.tx_tcp_stats.lat_avg.val / 1000.0, &lv);
            b.add(&self.vap_tx_lat_max, v.tx_tcp_stats.lat_max.val / 1000.0, &lv);
            b.add(&self.vap_tx_lat_min, v.tx_tcp_stats.lat_min.val / 1000.0, &lv);
            b.add(&self.vap_rx_goodbytes, &v.rx_tcp_stats.goodbytes, &lv);
            b.add(&self.vap_rx_lat_avg, v.rx_tcp_stats.lat_avg.val / 1000.0, &lv);
            b.add(&self.vap_rx_lat_max, v.rx_tcp_stats.lat_max.val / 1000.0, &lv);
            b.add(&self.vap_rx_lat_min, v.rx_tcp_stats.lat_min.val / 1000.0, &lv);
            let mov = &v.wifi_tx_latency_mov;
            b.add(&self.vap_tx_latency_mov_avg, mov.avg.val / 1000.0, &lv);
            b.add(&self.vap_tx_latency_mov_max, mov.max.val / 1000.0, &lv);
            b.add(&self.vap_tx_latency_mov_min, mov.min.val / 1000.0, &lv);
            b.add(&self.vap_tx_latency_mov_total, &mov.total, &lv);
            b.add(&self.vap_tx_latency_mov_count, &mov.total_count, &lv);
        }
    }

    /// Radio table rows joined with the stats row of the same name.
    pub(crate) fn export_radios(
        &self,
        b: &mut Batch,
        radios: &[RadioEntry],
        stats: &[RadioStats],
        l: &[String],
    ) {
        for p in radios {
            let lr = labels(&[&p.name, &p.radio, &l[1], &l[2], &l[3]]);

            b.add(&self.radio_current_antenna_gain, &p.current_antenna_gain, &lr);
            b.add(&self.radio_ht, &p.ht, &lr);
            b.add(&self.radio_max_tx_power, &p.max_txpower, &lr);
            b.add(&self.radio_min_tx_power, &p.min_txpower, &lr);
            b.add(&self.radio_nss, &p.nss, &lr);
            b.add(&self.radio_caps, &p.radio_caps, &lr);

            let Some(t) = stats.iter().find(|t| t.name.eq_ignore_ascii_case(&p.name)) else {
                continue;
            };

            b.add(&self.radio_tx_power, &t.tx_power, &lr);
            b.add(&self.radio_ast_be_xmit, &t.ast_be_xmit, &lr);
            b.add(&self.radio_channel, &t.channel, &lr);
            b.add(&self.radio_cu_self_rx, t.cu_self_rx.val / 100.0, &lr);
            b.add(&self.radio_cu_self_tx, t.cu_self_tx.val / 100.0, &lr);
            b.add(&self.radio_cu_total, t.cu_total.val / 100.0, &lr);
            b.add(&self.radio_ext_channel, &t.extchannel, &lr);
            b.add(&self.radio_gain, &t.gain, &lr);
            b.add(&self.radio_num_sta, &t.guest_num_sta, &with(&lr, &["guest"]));
            b.add(&self.radio_num_sta, &t.user_num_sta, &with(&lr, &["user"]));
            b.add(&self.radio_tx_packets, &t.tx_packets, &lr);
            b.add(&self.radio_tx_retries, &t.tx_retries, &lr);
        }
    }
}

pub(crate) fn export_uap(descs: &Descs, s: &Uap) -> Batch {
    let d = &s.common;
    let mut b = Batch::default();
    if skip(d) {
        return b;
    }

    let l = device_labels(d);
    let dev = &descs.device;

    descs.uap.export_stats(&mut b, &d.stat, &l);
    b.add(&dev.bytes_d, &s.bytes_d, &l);
    b.add(&dev.tx_bytes_d, &s.tx_bytes_d, &l);
    b.add(&dev.rx_bytes_d, &s.rx_bytes_d, &l);
    b.add(&dev.bytes_r, &d.bytes_r, &l);
    descs.uap.export_vaps(&mut b, &s.vap_table, &l);
    descs.usw.export_ports(&mut b, &s.port_table, &l);
    dev.export_bytes(&mut b, d, &l);
    dev.export_sys(&mut b, d, &l);
    dev.export_stations(&mut b, &l, &[("user", &d.user_num_sta), ("guest", &d.guest_num_sta)]);
    dev.export_temperature(&mut b, &l, &s.has_temperature, &s.general_temperature);
    descs.uap.export_radios(&mut b, &s.radio_table, &s.radio_table_stats, &l);
    dev.export_info(&mut b, d, &l);

    b
}
