use thiserror::Error;

/// Errors from building or writing a batch.
#[derive(Debug, Error)]
pub enum InfluxError {
    // ── Point construction ───────────────────────────────────────────
    #[error("invalid point for {measurement}: {reason}")]
    InvalidPoint {
        measurement: String,
        reason: &'static str,
    },

    // ── Transport ────────────────────────────────────────────────────
    #[error("building influx client: {0}")]
    Client(#[from] unpoller_api::Error),

    #[error("invalid influx URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("influxdb.Write(points): {0}")]
    Transport(#[from] reqwest::Error),

    #[error("influxdb.Write(points): HTTP {status}: {body}")]
    Write { status: u16, body: String },
}
