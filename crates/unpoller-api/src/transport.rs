// Shared transport configuration for building reqwest::Client instances.
//
// Every controller session gets its own client (and cookie jar) built
// from this config, so dropping a session also drops its idle connections.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("unpoller/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Trust additional CA certificates from the given PEM files.
    CustomCa(Vec<PathBuf>),
    /// Accept any certificate (for self-signed controllers).
    DangerAcceptInvalid,
}

impl TlsMode {
    /// Map a `verify_ssl` flag plus optional CA paths onto a mode.
    pub fn from_verify(verify_ssl: bool, ca_paths: &[PathBuf]) -> Self {
        if !verify_ssl {
            Self::DangerAcceptInvalid
        } else if ca_paths.is_empty() {
            Self::System
        } else {
            Self::CustomCa(ca_paths.to_vec())
        }
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
    /// Sent as `X-API-KEY` on every request when set.
    pub api_key: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(60),
            cookie_jar: None,
            api_key: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(paths) => {
                for path in paths {
                    let cert_pem = std::fs::read(path).map_err(|e| {
                        Error::Tls(format!("failed to read CA cert {}: {e}", path.display()))
                    })?;
                    let cert = reqwest::Certificate::from_pem(&cert_pem)
                        .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref key) = self.api_key {
            let mut value = HeaderValue::from_str(key.expose_secret())
                .map_err(|e| Error::Authentication {
                    message: format!("invalid API key header: {e}"),
                })?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert("X-API-KEY", value);
            builder = builder.default_headers(headers);
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}
