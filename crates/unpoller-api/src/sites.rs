// Site endpoints
//
// The site list is controller-scoped (`/api/stat/sites`) and carries
// each site's health subsystems.

use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::Site;

impl ControllerClient {
    /// List every site with health data.
    ///
    /// `GET /api/stat/sites`. A missing `desc` falls back to `name`, and
    /// `site_name` becomes `"<desc> (<name>)"`.
    pub async fn get_sites(&self) -> Result<Vec<Site>, Error> {
        let url = self.api_url("stat/sites")?;
        let mut sites: Vec<Site> = self.get(url).await?;

        for site in &mut sites {
            if site.desc.is_empty() {
                site.desc.clone_from(&site.name);
            }
            site.site_name = format!("{} ({})", site.desc, site.name);
            site.source_name = self.source().to_owned();
        }

        debug!(
            count = sites.len(),
            names = %sites.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(","),
            "found sites"
        );
        Ok(sites)
    }
}
