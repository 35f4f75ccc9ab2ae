// Client augmentation
//
// Joins each client to the names of the switch, AP and gateway it hangs
// off, and to a description of the radio it is associated with. PII
// redaction happens here too, after every lookup has used the real MAC.

use std::collections::HashMap;

use unpoller_api::Devices;

use super::config::ControllerConfig;
use super::pii::{redact_mac, redact_name};
use crate::metrics::Metrics;

/// Name lookup tables built from one controller's device list.
struct DeviceIndex {
    /// MAC to display name.
    names: HashMap<String, String>,
    /// BSSID to `"<device> <radio> <radio_name>:"`.
    bssids: HashMap<String, String>,
}

impl DeviceIndex {
    fn build(devices: &Devices) -> Self {
        let names = devices
            .commons()
            .map(|d| (d.mac.clone(), d.name.clone()))
            .collect();
        let bssids = devices
            .vaps()
            .map(|(device, vap)| {
                (
                    vap.bssid.clone(),
                    format!("{} {} {}:", device.name, vap.radio, vap.radio_name),
                )
            })
            .collect();
        Self { names, bssids }
    }

    fn name(&self, mac: &str) -> String {
        self.names.get(mac).cloned().unwrap_or_default()
    }
}

/// Fill in device names on clients and client DPI, apply PII settings,
/// and drop site data when `save_sites` is off. `devices` is always `Some`
/// on return.
pub fn augment_metrics(config: &ControllerConfig, mut metrics: Metrics) -> Metrics {
    let devices = metrics.devices.take().unwrap_or_default();
    let mut index = DeviceIndex::build(&devices);
    let (hash, drop) = (config.hash_pii, config.drop_pii);

    // Wired clients are sometimes devices too; real device names win.
    for client in &metrics.clients {
        let name = if client.name.is_empty() {
            &client.hostname
        } else {
            &client.name
        };
        index
            .names
            .entry(client.mac.clone())
            .or_insert_with(|| name.clone());
    }

    for client in &mut metrics.clients {
        client.sw_name = index.name(&client.sw_mac);
        client.ap_name = index.name(&client.ap_mac);
        client.gw_name = index.name(&client.gw_mac);
        client.radio_description = format!(
            "{}{}",
            index.bssids.get(&client.bssid).map_or("", String::as_str),
            client.radio_proto
        );

        client.mac = redact_mac(&client.mac, hash, drop);
        client.name = redact_name(&client.name, hash, drop);
        client.hostname = redact_name(&client.hostname, hash, drop);
        if drop {
            client.ip.clear();
        }
    }

    for dpi in &mut metrics.clients_dpi {
        let name = index.name(&dpi.mac);
        dpi.name = if name.is_empty() { dpi.mac.clone() } else { name };
        dpi.name = redact_name(&dpi.name, hash, drop);
        dpi.mac = redact_mac(&dpi.mac, hash, drop);
    }

    if !config.save_sites {
        metrics.sites.clear();
        metrics.sites_dpi.clear();
    }

    metrics.devices = Some(devices);
    metrics
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unpoller_api::{Client, DeviceCommon, DpiTable, Site, Uap, Usg, Usw, models::Vap};

    fn common(mac: &str, name: &str) -> DeviceCommon {
        DeviceCommon {
            mac: mac.into(),
            name: name.into(),
            ..DeviceCommon::default()
        }
    }

    fn bundle() -> Metrics {
        Metrics {
            sites: vec![Site::default()],
            clients: vec![
                Client {
                    mac: "c1".into(),
                    hostname: "laptop".into(),
                    ap_mac: "ap".into(),
                    gw_mac: "gw".into(),
                    bssid: "b1".into(),
                    radio_proto: "ac".into(),
                    ..Client::default()
                },
                Client {
                    mac: "sw".into(),
                    name: "not the switch".into(),
                    sw_mac: "sw".into(),
                    ..Client::default()
                },
            ],
            clients_dpi: vec![
                DpiTable {
                    mac: "c1".into(),
                    ..DpiTable::default()
                },
                DpiTable {
                    mac: "zz".into(),
                    ..DpiTable::default()
                },
            ],
            devices: Some(Devices {
                uaps: vec![Uap {
                    common: common("ap", "Office AP"),
                    vap_table: vec![Vap {
                        bssid: "b1".into(),
                        radio: "na".into(),
                        radio_name: "wifi1".into(),
                        ..Vap::default()
                    }],
                    ..Uap::default()
                }],
                usgs: vec![Usg {
                    common: common("gw", "Gateway"),
                    ..Usg::default()
                }],
                usws: vec![Usw {
                    common: common("sw", "Core Switch"),
                    ..Usw::default()
                }],
                udms: Vec::new(),
            }),
            ..Metrics::default()
        }
    }

    #[test]
    fn clients_get_parent_names() {
        let m = augment_metrics(&ControllerConfig::default(), bundle());

        assert_eq!(m.clients[0].ap_name, "Office AP");
        assert_eq!(m.clients[0].gw_name, "Gateway");
        assert_eq!(m.clients[0].radio_description, "Office AP na wifi1:ac");
        assert_eq!(m.clients[1].sw_name, "Core Switch");
        assert_eq!(m.sites.len(), 1);
    }

    #[test]
    fn client_dpi_names_fall_back_to_mac() {
        let m = augment_metrics(&ControllerConfig::default(), bundle());
        assert_eq!(m.clients_dpi[0].name, "laptop");
        assert_eq!(m.clients_dpi[1].name, "zz");
    }

    #[test]
    fn save_sites_off_drops_sites_only() {
        let config = ControllerConfig {
            save_sites: false,
            ..ControllerConfig::default()
        };
        let m = augment_metrics(&config, bundle());
        assert!(m.sites.is_empty());
        assert_eq!(m.clients.len(), 2);
        assert_eq!(m.devices.unwrap().len(), 3);
    }

    #[test]
    fn missing_devices_become_empty() {
        let m = augment_metrics(&ControllerConfig::default(), Metrics::default());
        assert!(m.devices.unwrap().is_empty());
    }

    #[test]
    fn hashing_happens_after_lookup() {
        let config = ControllerConfig {
            hash_pii: true,
            ..ControllerConfig::default()
        };
        let m = augment_metrics(&config, bundle());
        assert_eq!(m.clients[0].ap_name, "Office AP");
        assert_ne!(m.clients[0].mac, "c1");
        assert_eq!(m.clients[0].hostname.len(), 24);
        assert_eq!(m.clients_dpi[0].name, redact_name("laptop", true, false));
    }

    #[test]
    fn drop_pii_blanks_identity() {
        let config = ControllerConfig {
            drop_pii: true,
            ..ControllerConfig::default()
        };
        let mut input = bundle();
        input.clients[0].ip = "10.0.0.5".into();
        let m = augment_metrics(&config, input);
        assert_eq!(m.clients[0].ip, "");
        assert_eq!(m.clients[0].hostname, "");
        assert_eq!(m.clients[0].mac, "");
    }
}
