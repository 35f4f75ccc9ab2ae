// Client (station) endpoints

use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{Client, Site};

impl ControllerClient {
    /// Connected clients across `sites`.
    ///
    /// `GET /api/s/{site}/stat/sta`. Blank names and hostnames are filled
    /// from each other (and the MAC) so every client has a display name.
    pub async fn get_clients(&self, sites: &[Site]) -> Result<Vec<Client>, Error> {
        let mut out = Vec::new();

        for site in sites {
            debug!(site = %site.site_name, "polling clients");
            let url = self.site_url(&site.name, "stat/sta")?;
            let mut clients: Vec<Client> = self.get(url).await?;

            for client in &mut clients {
                client.site_name.clone_from(&site.site_name);
                client.source_name = self.source().to_owned();
                client.hostname = pick(&[&client.hostname, &client.name, &client.mac]).to_owned();
                client.name = pick(&[&client.name, &client.hostname]).to_owned();
            }
            out.extend(clients);
        }

        Ok(out)
    }
}

/// The first non-empty string.
pub(crate) fn pick<'a>(candidates: &[&'a str]) -> &'a str {
    candidates.iter().copied().find(|s| !s.is_empty()).unwrap_or_default()
}
