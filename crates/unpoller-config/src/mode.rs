// Run modes
//
// `poller.mode` picks which outputs are registered.

use strum::{Display, EnumString};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    /// InfluxDB on a ticker; the default.
    #[default]
    #[strum(to_string = "influx", serialize = "", serialize = "influxdb")]
    Push,
    /// One InfluxDB cycle, then exit.
    #[strum(to_string = "influxlambda", serialize = "lambda")]
    Lambda,
    /// Prometheus exporter only.
    #[strum(to_string = "prometheus", serialize = "exporter")]
    Pull,
    /// InfluxDB and Prometheus together.
    #[strum(to_string = "both")]
    Both,
}

impl Mode {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        raw.trim().parse().map_err(|_| ConfigError::Validation {
            field: "poller.mode".into(),
            reason: format!(
                "unknown mode '{raw}', expected influxlambda, prometheus, exporter or both"
            ),
        })
    }

    /// Whether the InfluxDB output is registered.
    pub fn push(self) -> bool {
        matches!(self, Self::Push | Self::Lambda | Self::Both)
    }

    /// Whether the Prometheus output is registered.
    pub fn pull(self) -> bool {
        matches!(self, Self::Pull | Self::Both)
    }
}
