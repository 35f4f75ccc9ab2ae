// Configuration errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    // ── Loading ──────────────────────────────────────────────────────
    #[error("no readable config file found in: {paths}")]
    NoConfigFile { paths: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("parsing XML config {path}: {source}")]
    Xml {
        path: String,
        #[source]
        source: quick_xml::de::DeError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ── Values ───────────────────────────────────────────────────────
    #[error("reading secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
