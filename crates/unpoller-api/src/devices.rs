// Device endpoints
//
// `stat/device` returns every device role in one list; each entry is
// routed to its typed model by the `type` key.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::client::ControllerClient;
use crate::clients::pick;
use crate::error::Error;
use crate::models::{DeviceCommon, Devices, Site, Uap, Udm, Usg, Usw};

impl ControllerClient {
    /// Devices across `sites`, grouped by role.
    ///
    /// `GET /api/s/{site}/stat/device`. Entries that fail to decode are
    /// logged one by one. Entries of an unsupported type are skipped and
    /// summarised in one line per call, so the gap between the controller's
    /// device count and ours is visible.
    pub async fn get_devices(&self, sites: &[Site]) -> Result<Devices, Error> {
        let mut devices = Devices::default();
        let mut skipped = BTreeMap::new();

        for site in sites {
            debug!(site = %site.site_name, "polling devices");
            let url = self.site_url(&site.name, "stat/device")?;
            let raw: Vec<serde_json::Value> = self.get(url).await?;
            devices.extend(parse_devices(raw, &site.site_name, self.source(), &mut skipped));
        }

        if !skipped.is_empty() {
            info!(
                source = self.source(),
                skipped = ?skipped,
                "skipped devices of unsupported types"
            );
        }

        Ok(devices)
    }
}

/// Route raw device objects to their typed models.
///
/// Unsupported types are counted into `skipped` by type name.
pub(crate) fn parse_devices(
    raw: Vec<serde_json::Value>,
    site_name: &str,
    source: &str,
    skipped: &mut BTreeMap<String, usize>,
) -> Devices {
    let mut devices = Devices::default();

    for value in raw {
        let asset_type = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<type key missing>")
            .to_owned();

        match asset_type.as_str() {
            "uap" => {
                if let Some(mut dev) = decode::<Uap>(&asset_type, value) {
                    stamp(&mut dev.common, site_name, source);
                    devices.uaps.push(dev);
                }
            }
            "ugw" | "usg" => {
                if let Some(mut dev) = decode::<Usg>(&asset_type, value) {
                    stamp(&mut dev.common, site_name, source);
                    devices.usgs.push(dev);
                }
            }
            "usw" => {
                if let Some(mut dev) = decode::<Usw>(&asset_type, value) {
                    stamp(&mut dev.common, site_name, source);
                    devices.usws.push(dev);
                }
            }
            "udm" => {
                if let Some(mut dev) = decode::<Udm>(&asset_type, value) {
                    stamp(&mut dev.common, site_name, source);
                    devices.udms.push(dev);
                }
            }
            _ => *skipped.entry(asset_type).or_default() += 1,
        }
    }

    devices
}

fn decode<T: DeserializeOwned>(asset_type: &str, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(dev) => Some(dev),
        Err(e) => {
            error!(asset_type, error = %e, "failed to decode device");
            None
        }
    }
}

fn stamp(common: &mut DeviceCommon, site_name: &str, source: &str) {
    common.name = pick(&[&common.name, &common.mac]).to_owned();
    site_name.clone_into(&mut common.site_name);
    source.clone_into(&mut common.source_name);
}
