// Line-protocol writer
//
// One POST per batch to the InfluxDB v1 `/write` endpoint.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use unpoller_api::{TlsMode, TransportConfig};

use crate::config::InfluxConfig;
use crate::error::InfluxError;

/// HTTP client bound to one database.
#[derive(Debug, Clone)]
pub struct InfluxWriter {
    http: reqwest::Client,
    write_url: Url,
    user: String,
    pass: SecretString,
}

impl InfluxWriter {
    pub fn new(config: &InfluxConfig) -> Result<Self, InfluxError> {
        let transport = TransportConfig {
            tls: TlsMode::from_verify(config.verify_ssl, &[]),
            ..TransportConfig::default()
        };
        let http = transport.build_client()?;

        let mut write_url = Url::parse(&format!("{}/write", config.url.trim_end_matches('/')))?;
        write_url
            .query_pairs_mut()
            .append_pair("db", &config.db)
            .append_pair("precision", "ns");

        Ok(Self {
            http,
            write_url,
            user: config.user.clone(),
            pass: config.pass.clone(),
        })
    }

    pub fn write_url(&self) -> &Url {
        &self.write_url
    }

    /// Send newline-separated points. An empty body is not sent.
    pub async fn write(&self, body: String) -> Result<(), InfluxError> {
        if body.is_empty() {
            return Ok(());
        }

        debug!(url = %self.write_url, bytes = body.len(), "writing points");
        let resp = self
            .http
            .post(self.write_url.clone())
            .basic_auth(&self.user, Some(self.pass.expose_secret()))
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InfluxError::Write {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
