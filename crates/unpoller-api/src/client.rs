// Controller HTTP client
//
// Wraps `reqwest::Client` with UniFi URL construction, envelope unwrapping,
// and platform-aware path prefixing. Endpoint groups (sites, clients,
// devices, ...) are inherent methods implemented in sibling modules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::{Error, preview};
use crate::transport::TransportConfig;

/// Standard `{ "meta": { "rc": "ok" }, "data": [...] }` envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    meta: Meta,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    rc: String,
    #[serde(default)]
    msg: Option<String>,
}

/// UniFi OS wraps some errors as `{"error":{"code":N,"message":"..."}}` with HTTP 200.
#[derive(Deserialize)]
struct UnifiOsError {
    error: Option<UnifiOsErrorInner>,
}

#[derive(Deserialize)]
struct UnifiOsErrorInner {
    code: u16,
    message: Option<String>,
}

/// HTTP client bound to one controller.
///
/// `source` is the controller URL exactly as configured; it is stamped
/// onto every record this client returns.
#[derive(Debug, Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    source: String,
    platform: ControllerPlatform,
}

impl ControllerClient {
    /// Create a client with its own cookie jar.
    pub fn new(
        url: &str,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Self::with_client(http, url, platform)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        url: &str,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        let source = url.trim_end_matches('/').to_owned();
        let base_url = Url::parse(&source)?;
        Ok(Self {
            http,
            base_url,
            source,
            platform,
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The controller URL as configured, used as the `source` tag.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}{prefix}{path}` for an absolute controller path.
    pub(crate) fn path_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.api_prefix();
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}{prefix}/{path}"))?)
    }

    /// `{base}{prefix}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.path_url(&format!("api/{path}"))
    }

    /// `{base}{prefix}/api/s/{site}/{path}`
    pub(crate) fn site_url(&self, site: &str, path: &str) -> Result<Url, Error> {
        if site.is_empty() {
            return Err(Error::NoSiteProvided);
        }
        self.path_url(&format!("api/s/{site}/{path}"))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_envelope(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_envelope(resp).await
    }

    /// Fetch a controller path and return the body untouched.
    ///
    /// The platform prefix is applied, so `/api/s/default/stat/device`
    /// works against both classic and UniFi OS controllers.
    pub async fn get_json(&self, path: &str) -> Result<String, Error> {
        let url = self.path_url(path)?;
        debug!("GET {} (raw)", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }
        Ok(body)
    }

    /// Parse the `{ meta, data }` envelope, returning `data` on success.
    ///
    /// Also handles the UniFi OS `{"error": {...}}` shape returned with HTTP 200.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Api {
                message: "insufficient permissions (HTTP 403)".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if let Ok(UnifiOsError { error: Some(err) }) = serde_json::from_str::<UnifiOsError>(&body)
        {
            let msg = err.message.unwrap_or_default();
            return Err(if err.code == 401 {
                Error::Authentication { message: msg }
            } else {
                Error::Api {
                    message: format!("UniFi OS error {}: {msg}", err.code),
                }
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        match envelope.meta.rc.as_str() {
            "ok" => Ok(envelope.data),
            _ => Err(Error::Api {
                message: envelope
                    .meta
                    .msg
                    .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(url: &str, platform: ControllerPlatform) -> ControllerClient {
        ControllerClient::with_client(reqwest::Client::new(), url, platform).unwrap()
    }

    #[test]
    fn site_url_applies_platform_prefix() {
        let c = client("https://udm.local/", ControllerPlatform::UnifiOs);
        assert_eq!(
            c.site_url("default", "stat/sta").unwrap().as_str(),
            "https://udm.local/proxy/network/api/s/default/stat/sta"
        );
        assert_eq!(c.source(), "https://udm.local");

        let c = client("https://ctrl:8443", ControllerPlatform::ClassicController);
        assert_eq!(
            c.api_url("stat/sites").unwrap().as_str(),
            "https://ctrl:8443/api/stat/sites"
        );
    }

    #[test]
    fn site_url_requires_site() {
        let c = client("https://ctrl:8443", ControllerPlatform::ClassicController);
        assert!(matches!(c.site_url("", "stat/sta"), Err(Error::NoSiteProvided)));
    }
}
