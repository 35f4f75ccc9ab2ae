// UniFi input configuration
//
// Runtime view of the `[unifi]` section. The config crate resolves file
// values, environment overrides and `[unifi.defaults]` inheritance before
// building these; secrets arrive already wrapped.

use std::path::PathBuf;

use secrecy::SecretString;

use unpoller_api::{TlsMode, TransportConfig};

pub const DEFAULT_URL: &str = "https://127.0.0.1:8443";
pub const DEFAULT_USER: &str = "unifipoller";
pub const DEFAULT_PASS: &str = "unifipoller";
pub const DEFAULT_SITE: &str = "all";

/// One upstream controller and what to collect from it.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub url: String,
    /// Alias used by targeted scrapes; the URL when unset.
    pub role: String,
    pub user: String,
    pub pass: SecretString,
    pub api_key: Option<SecretString>,
    pub sites: Vec<String>,
    pub verify_ssl: bool,
    /// Extra PEM CA bundles trusted when `verify_ssl` is on.
    pub ssl_cert_paths: Vec<PathBuf>,
    pub save_sites: bool,
    pub save_ids: bool,
    pub save_events: bool,
    pub save_alarms: bool,
    pub save_anomalies: bool,
    pub save_dpi: bool,
    pub hash_pii: bool,
    pub drop_pii: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            role: String::new(),
            user: DEFAULT_USER.into(),
            pass: SecretString::from(DEFAULT_PASS.to_owned()),
            api_key: None,
            sites: vec![DEFAULT_SITE.into()],
            verify_ssl: false,
            ssl_cert_paths: Vec::new(),
            save_sites: true,
            save_ids: false,
            save_events: false,
            save_alarms: false,
            save_anomalies: false,
            save_dpi: false,
            hash_pii: false,
            drop_pii: false,
        }
    }
}

impl ControllerConfig {
    /// The alias this controller answers to.
    pub fn role(&self) -> &str {
        if self.role.is_empty() { &self.url } else { &self.role }
    }

    /// A copy of this template bound to a new URL, for dynamic controllers.
    pub fn for_url(&self, url: &str) -> Self {
        Self {
            url: url.to_owned(),
            role: url.to_owned(),
            ..self.clone()
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from_verify(self.verify_ssl, &self.ssl_cert_paths),
            api_key: self.api_key.clone(),
            ..TransportConfig::default()
        }
    }
}

/// The `[unifi]` section.
#[derive(Debug, Clone, Default)]
pub struct UnifiConfig {
    pub disable: bool,
    /// Allow scrapes to name controllers that are not configured.
    pub dynamic: bool,
    /// Template for dynamic controllers.
    pub defaults: ControllerConfig,
    pub controllers: Vec<ControllerConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_falls_back_to_url() {
        let config = ControllerConfig::default();
        assert_eq!(config.role(), DEFAULT_URL);

        let dynamic = config.for_url("https://b.local:8443");
        assert_eq!(dynamic.role(), "https://b.local:8443");
        assert!(dynamic.save_sites);
        assert_eq!(dynamic.sites, ["all"]);
    }
}
