// File-level configuration model
//
// One struct per config section, shaped like the file. Controller fields
// are optional so an entry can inherit anything it leaves unset from
// `[unifi.defaults]`. The runtime configs each plugin consumes are built
// from these once loading and overrides are done.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use unpoller_core::{ControllerConfig, UnifiConfig};
use unpoller_influx::InfluxConfig;
use unpoller_prom::PromConfig;

use crate::error::ConfigError;
use crate::mode::Mode;
use crate::secret::{self, resolve_secret};

// ── Sections ────────────────────────────────────────────────────────

/// The whole config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poller: PollerSection,
    pub unifi: UnifiSection,
    pub influxdb: InfluxSection,
    pub prometheus: PromSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSection {
    pub debug: bool,
    pub quiet: bool,
    /// Raw mode string; read it through [`Settings::mode`].
    pub mode: String,
    /// Consecutive failed push cycles before the poller gives up; 0 never.
    pub max_errors: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifiSection {
    pub disable: bool,
    pub dynamic: bool,
    /// Template every controller (and every dynamic one) inherits from.
    pub defaults: ControllerSection,
    #[serde(alias = "controller", skip_serializing_if = "Vec::is_empty")]
    pub controllers: Vec<ControllerSection>,
}

/// One `[[unifi.controller]]` entry. Unset fields inherit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(with = "secret::opt", skip_serializing_if = "Option::is_none")]
    pub pass: Option<SecretString>,
    #[serde(with = "secret::opt", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cert_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_sites: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_ids: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_alarms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_anomalies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dpi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_pii: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_pii: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxSection {
    pub disable: bool,
    pub url: String,
    pub user: String,
    #[serde(with = "secret::opt", skip_serializing_if = "Option::is_none")]
    pub pass: Option<SecretString>,
    pub db: String,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub verify_ssl: bool,
    pub dead_ports: bool,
    pub dpi_app_totals: bool,
}

impl Default for InfluxSection {
    fn default() -> Self {
        let runtime = InfluxConfig::default();
        Self {
            disable: runtime.disable,
            url: runtime.url,
            user: runtime.user,
            pass: None,
            db: runtime.db,
            interval: runtime.interval,
            verify_ssl: runtime.verify_ssl,
            dead_ports: runtime.dead_ports,
            dpi_app_totals: runtime.dpi_app_totals,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromSection {
    pub disable: bool,
    pub http_listen: String,
    pub namespace: String,
    pub report_errors: bool,
    pub buffer: usize,
}

impl Default for PromSection {
    fn default() -> Self {
        let runtime = PromConfig::default();
        Self {
            disable: runtime.disable,
            http_listen: runtime.http_listen,
            namespace: runtime.namespace,
            report_errors: runtime.report_errors,
            buffer: runtime.buffer,
        }
    }
}

// ── Inheritance ─────────────────────────────────────────────────────

impl ControllerSection {
    /// Fill every unset field from `parent`.
    pub fn inherit(&self, parent: &Self) -> Self {
        Self {
            url: self.url.clone().or_else(|| parent.url.clone()),
            role: self.role.clone().or_else(|| parent.role.clone()),
            user: self.user.clone().or_else(|| parent.user.clone()),
            pass: self.pass.clone().or_else(|| parent.pass.clone()),
            api_key: self.api_key.clone().or_else(|| parent.api_key.clone()),
            sites: self.sites.clone().or_else(|| parent.sites.clone()),
            verify_ssl: self.verify_ssl.or(parent.verify_ssl),
            ssl_cert_paths: self
                .ssl_cert_paths
                .clone()
                .or_else(|| parent.ssl_cert_paths.clone()),
            save_sites: self.save_sites.or(parent.save_sites),
            save_ids: self.save_ids.or(parent.save_ids),
            save_events: self.save_events.or(parent.save_events),
            save_alarms: self.save_alarms.or(parent.save_alarms),
            save_anomalies: self.save_anomalies.or(parent.save_anomalies),
            save_dpi: self.save_dpi.or(parent.save_dpi),
            hash_pii: self.hash_pii.or(parent.hash_pii),
            drop_pii: self.drop_pii.or(parent.drop_pii),
        }
    }

    /// Build the runtime config, falling back to built-in defaults and
    /// reading any `file://` secrets.
    pub fn to_runtime(&self) -> Result<ControllerConfig, ConfigError> {
        let builtin = ControllerConfig::default();

        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(builtin.url.as_str())
            .trim_end_matches('/')
            .to_owned();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation {
                field: "unifi.controller.url".into(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }

        let pass = match &self.pass {
            Some(pass) => resolve_secret(pass)?,
            None => builtin.pass,
        };
        let api_key = match &self.api_key {
            Some(key) => Some(resolve_secret(key)?),
            None => None,
        }
        .filter(|key| !key.expose_secret().is_empty());

        let sites = match &self.sites {
            Some(sites) if !sites.is_empty() => sites.clone(),
            _ => builtin.sites,
        };

        Ok(ControllerConfig {
            role: self.role.clone().unwrap_or_default(),
            user: self.user.clone().unwrap_or(builtin.user),
            pass,
            api_key,
            sites,
            verify_ssl: self.verify_ssl.unwrap_or(builtin.verify_ssl),
            ssl_cert_paths: self
                .ssl_cert_paths
                .iter()
                .flatten()
                .map(PathBuf::from)
                .collect(),
            save_sites: self.save_sites.unwrap_or(builtin.save_sites),
            save_ids: self.save_ids.unwrap_or(builtin.save_ids),
            save_events: self.save_events.unwrap_or(builtin.save_events),
            save_alarms: self.save_alarms.unwrap_or(builtin.save_alarms),
            save_anomalies: self.save_anomalies.unwrap_or(builtin.save_anomalies),
            save_dpi: self.save_dpi.unwrap_or(builtin.save_dpi),
            hash_pii: self.hash_pii.unwrap_or(builtin.hash_pii),
            drop_pii: self.drop_pii.unwrap_or(builtin.drop_pii),
            url,
        })
    }
}

// ── Runtime configs ─────────────────────────────────────────────────

impl Settings {
    pub fn mode(&self) -> Result<Mode, ConfigError> {
        Mode::parse(&self.poller.mode)
    }

    /// Turn TLS verification on for the template and every controller.
    pub fn force_verify_ssl(&mut self) {
        self.unifi.defaults.verify_ssl = Some(true);
        for controller in &mut self.unifi.controllers {
            controller.verify_ssl = Some(true);
        }
    }

    /// The `[unifi]` section with defaults applied. With no controllers
    /// listed and dynamic lookups off, the template itself is polled.
    pub fn unifi_config(&self) -> Result<UnifiConfig, ConfigError> {
        let section = &self.unifi;
        let defaults = section.defaults.to_runtime()?;

        let mut controllers = section
            .controllers
            .iter()
            .map(|c| c.inherit(&section.defaults).to_runtime())
            .collect::<Result<Vec<_>, _>>()?;
        if controllers.is_empty() && !section.dynamic {
            controllers.push(defaults.clone());
        }

        Ok(UnifiConfig {
            disable: section.disable,
            dynamic: section.dynamic,
            defaults,
            controllers,
        })
    }

    pub fn influx_config(&self) -> Result<InfluxConfig, ConfigError> {
        let section = &self.influxdb;
        let builtin = InfluxConfig::default();

        let pass = match &section.pass {
            Some(pass) => resolve_secret(pass)?,
            None => builtin.pass,
        };

        Ok(InfluxConfig {
            disable: section.disable,
            url: section.url.trim_end_matches('/').to_owned(),
            user: section.user.clone(),
            pass,
            db: section.db.clone(),
            interval: section.interval,
            verify_ssl: section.verify_ssl,
            dead_ports: section.dead_ports,
            dpi_app_totals: section.dpi_app_totals,
            max_errors: self.poller.max_errors,
        })
    }

    pub fn prom_config(&self) -> PromConfig {
        let section = &self.prometheus;
        PromConfig {
            disable: section.disable,
            http_listen: section.http_listen.clone(),
            namespace: section.namespace.clone(),
            report_errors: section.report_errors,
            buffer: section.buffer,
        }
    }
}
