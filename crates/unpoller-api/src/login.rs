// Controller authentication
//
// Cookie-based session login and controller platform detection.
// The login endpoint sets a session cookie in the client's jar;
// subsequent requests use that cookie automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::auth::ControllerPlatform;
use crate::client::ControllerClient;
use crate::error::{Error, preview};
use crate::transport::TransportConfig;

impl ControllerClient {
    /// Authenticate with username/password.
    ///
    /// - UniFi OS: `POST /api/auth/login`
    /// - Classic: `POST /api/login`
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.base_url().join(self.platform().login_path())?;

        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
            "strict": true,
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// Auto-detect the controller platform by probing login endpoints.
    ///
    /// UniFi OS answers `/api/auth/login` with anything but a 404; a
    /// classic controller has no such route.
    pub async fn detect_platform(
        url: &str,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;
        let base_url = url::Url::parse(url.trim_end_matches('/'))?;

        let unifi_os_url = base_url.join(ControllerPlatform::UnifiOs.login_path())?;
        debug!("probing UniFi OS at {}", unifi_os_url);

        if let Ok(resp) = http.get(unifi_os_url).send().await {
            if resp.status() != reqwest::StatusCode::NOT_FOUND {
                debug!("detected UniFi OS platform");
                return Ok(ControllerPlatform::UnifiOs);
            }
        }

        let classic_url = base_url.join(ControllerPlatform::ClassicController.login_path())?;
        debug!("probing classic controller at {}", classic_url);

        match http.get(classic_url).send().await {
            Ok(_) => {
                debug!("detected classic controller");
                Ok(ControllerPlatform::ClassicController)
            }
            Err(e) => Err(Error::Transport(e)),
        }
    }

    /// Build a client for `url`: detect the platform, then log in unless
    /// the transport carries an API key.
    pub async fn connect(
        url: &str,
        username: &str,
        password: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let platform = Self::detect_platform(url, transport).await?;
        let client = Self::new(url, platform, transport)?;
        if transport.api_key.is_none() {
            client.login(username, password).await?;
        }
        Ok(client)
    }
}
