// Metrics shared by every device role
//
// UAP, USG, USW and UDM all export info, uptime, byte totals, system load
// and station counts under `<ns>_device_`.

use prometheus::Result;

use unpoller_api::{DeviceCommon, FlexBool, FlexInt};

use crate::export::{Batch, Builder, Desc, labels, with};

const LABELS: &[&str] = &["type", "site_name", "name", "source"];
const INFO: &[&str] = &["version", "model", "serial", "mac", "ip", "id"];

pub(crate) struct DeviceDescs {
    info: Desc,
    uptime: Desc,
    temperature: Desc,
    max_power: Desc,
    fan_level: Desc,
    tx_bytes: Desc,
    rx_bytes: Desc,
    bytes: Desc,
    pub(crate) bytes_r: Desc,
    pub(crate) bytes_d: Desc,
    pub(crate) tx_bytes_d: Desc,
    pub(crate) rx_bytes_d: Desc,
    stations: Desc,
    load_1: Desc,
    load_5: Desc,
    load_15: Desc,
    mem_used: Desc,
    mem_total: Desc,
    mem_buffer: Desc,
    cpu: Desc,
    mem: Desc,
    upgradable: Desc,
}

impl DeviceDescs {
    pub(crate) fn new(b: &mut Builder<'_>) -> Result<Self> {
        b.subsystem("device");
        let l = LABELS;
        let info: Vec<&str> = LABELS.iter().chain(INFO).copied().collect();
        let temp: Vec<&str> = LABELS.iter().chain(&["temp_area", "temp_type"]).copied().collect();
        let stations: Vec<&str> = LABELS.iter().chain(&["station_type"]).copied().collect();

        Ok(Self {
            info: b.gauge("info", "Device Information", &info)?,
            uptime: b.gauge("uptime_seconds", "Device Uptime", l)?,
            temperature: b.gauge("temperature_celsius", "Temperature", &temp)?,
            max_power: b.gauge("max_power_total", "Total Max Power", l)?,
            fan_level: b.gauge("fan_level", "Fan Level", l)?,
            tx_bytes: b.counter("transmit_bytes_total", "Total Transmitted Bytes", l)?,
            rx_bytes: b.counter("receive_bytes_total", "Total Received Bytes", l)?,
            bytes: b.counter("bytes_total", "Total Bytes Transferred", l)?,
            bytes_r: b.gauge("rate_bytes", "Transfer Rate", l)?,
            bytes_d: b.counter("d_bytes", "Total Bytes D", l)?,
            tx_bytes_d: b.counter("d_tranmsit_bytes", "Transmit Bytes D", l)?,
            rx_bytes_d: b.counter("d_receive_bytes", "Receive Bytes D", l)?,
            stations: b.gauge("stations", "Number of Stations", &stations)?,
            load_1: b.gauge("load_average_1", "System Load Average 1 Minute", l)?,
            load_5: b.gauge("load_average_5", "System Load Average 5 Minutes", l)?,
            load_15: b.gauge("load_average_15", "System Load Average 15 Minutes", l)?,
            mem_used: b.gauge("memory_used_bytes", "System Memory Used", l)?,
            mem_total: b.gauge("memory_installed_bytes", "System Installed Memory", l)?,
            mem_buffer: b.gauge("memory_buffer_bytes", "System Memory Buffer", l)?,
            cpu: b.gauge("cpu_utilization_ratio", "System CPU % Utilized", l)?,
            mem: b.gauge("memory_utilization_ratio", "System Memory % Utilized", l)?,
            upgradable: b.gauge("upgradable", "Upgrade-able", l)?,
        })
    }

    /// Info, uptime and upgrade state.
    pub(crate) fn export_info(&self, b: &mut Batch, d: &DeviceCommon, l: &[String]) {
        let info = with(l, &[&d.version, &d.model, &d.serial, &d.mac, &d.ip, &d.id]);
        b.add(&self.info, 1.0, &info);
        b.add(&self.uptime, &d.uptime, l);
        b.add(&self.upgradable, flag(&d.upgradable), l);
    }

    pub(crate) fn export_bytes(&self, b: &mut Batch, d: &DeviceCommon, l: &[String]) {
        b.add(&self.tx_bytes, &d.tx_bytes, l);
        b.add(&self.rx_bytes, &d.rx_bytes, l);
        b.add(&self.bytes, d.tx_bytes.val + d.rx_bytes.val, l);
    }

    /// Load, memory and the CPU/memory percentages as ratios.
    pub(crate) fn export_sys(&self, b: &mut Batch, d: &DeviceCommon, l: &[String]) {
        let s = &d.sys_stats;
        b.add(&self.load_1, &s.loadavg_1, l);
        b.add(&self.load_5, &s.loadavg_5, l);
        b.add(&self.load_15, &s.loadavg_15, l);
        b.add(&self.mem_used, &s.mem_used, l);
        b.add(&self.mem_total, &s.mem_total, l);
        b.add(&self.mem_buffer, &s.mem_buffer, l);
        b.add(&self.cpu, d.system_stats.cpu.val / 100.0, l);
        b.add(&self.mem, d.system_stats.mem.val / 100.0, l);
    }

    /// One `stations` series per station type.
    pub(crate) fn export_stations(&self, b: &mut Batch, l: &[String], counts: &[(&str, &FlexInt)]) {
        for &(kind, count) in counts {
            b.add(&self.stations, count, &with(l, &[kind]));
        }
    }

    pub(crate) fn export_temperature(&self, b: &mut Batch, l: &[String], has: &FlexBool, temp: &FlexInt) {
        if has.val {
            b.add(&self.temperature, temp, &with(l, &["general", "board"]));
        }
    }

    pub(crate) fn export_fan(&self, b: &mut Batch, l: &[String], has: &FlexBool, level: &FlexInt) {
        if has.val {
            b.add(&self.fan_level, level, l);
        }
    }

    pub(crate) fn export_max_power(&self, b: &mut Batch, l: &[String], power: &FlexInt) {
        if !power.txt.is_empty() {
            b.add(&self.max_power, power, l);
        }
    }
}

/// Devices not adopted, or blinking their locate LED, export nothing.
pub(crate) fn skip(d: &DeviceCommon) -> bool {
    !d.adopted.val || d.locating.val
}

/// `type`, `site_name`, `name`, `source`.
pub(crate) fn device_labels(d: &DeviceCommon) -> Vec<String> {
    labels(&[&d.device_type, &d.site_name, &d.name, &d.source_name])
}

pub(crate) fn flag(b: &FlexBool) -> f64 {
    if b.val { 1.0 } else { 0.0 }
}
