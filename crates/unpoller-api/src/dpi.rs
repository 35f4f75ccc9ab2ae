// Deep-packet-inspection endpoints and category names

use serde_json::json;
use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{DpiTable, Site};

impl ControllerClient {
    /// Per-site DPI totals.
    ///
    /// `POST /api/s/{site}/stat/sitedpi` with `{"type": "by_app"}`
    pub async fn get_site_dpi(&self, sites: &[Site]) -> Result<Vec<DpiTable>, Error> {
        self.dpi(sites, "stat/sitedpi").await
    }

    /// Per-client DPI totals.
    ///
    /// `POST /api/s/{site}/stat/stadpi` with `{"type": "by_app"}`
    pub async fn get_clients_dpi(&self, sites: &[Site]) -> Result<Vec<DpiTable>, Error> {
        self.dpi(sites, "stat/stadpi").await
    }

    async fn dpi(&self, sites: &[Site], path: &str) -> Result<Vec<DpiTable>, Error> {
        let mut out = Vec::new();

        for site in sites {
            debug!(site = %site.site_name, path, "polling DPI");
            let url = self.site_url(&site.name, path)?;
            let mut tables: Vec<DpiTable> = self.post(url, &json!({ "type": "by_app" })).await?;

            for table in &mut tables {
                table.site_name.clone_from(&site.site_name);
                table.source_name = self.source().to_owned();
            }
            out.extend(tables);
        }

        Ok(out)
    }
}

/// Human name for a DPI category id. Unlisted ids are `"Unknown"`.
pub fn category_name(cat: i64) -> &'static str {
    match cat {
        0 => "Instant messengers",
        1 => "P2P",
        3 => "File Transfer",
        4 => "Streaming Media",
        5 => "Mail and Collaboration",
        6 => "Voice over IP",
        7 => "Database",
        8 => "Games",
        9 => "Network Management",
        10 => "Remote Access Terminals",
        11 => "Bypass Proxies and Tunnels",
        12 => "Stock Market",
        13 => "Web",
        14 => "Security Update",
        15 => "Web IM",
        17 => "Business",
        18..=20 => "Network Protocols",
        23 => "Private Protocol",
        24 => "Social Network",
        _ => "Unknown",
    }
}

/// Name for an application within a category.
///
/// Application ids are only unique inside their category and the
/// controller publishes no table for them, so the pair is rendered.
pub fn application_name(cat: i64, app: i64) -> String {
    format!("Unknown ({cat}:{app})")
}
