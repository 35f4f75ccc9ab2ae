// Controller status

use serde::Deserialize;
use tracing::debug;

use crate::client::ControllerClient;
use crate::error::{Error, preview};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Status {
    meta: StatusMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusMeta {
    server_version: String,
    up: bool,
}

impl ControllerClient {
    /// The controller's software version from `GET /status`.
    ///
    /// `/status` is unauthenticated and carries no `data`, so it is read
    /// directly rather than through the envelope.
    pub async fn server_version(&self) -> Result<String, Error> {
        let body = self.get_json("/status").await?;
        let status: Status = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;
        debug!(
            version = %status.meta.server_version,
            up = status.meta.up,
            "controller status"
        );
        Ok(status.meta.server_version)
    }
}
