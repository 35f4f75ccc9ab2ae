// Config loading
//
// Layers, lowest first: built-in defaults, the config file, then `UP_`
// environment variables. The file format follows the extension.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use tracing::debug;

use crate::error::ConfigError;
use crate::settings::Settings;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/unpoller/up.conf";
pub const ENV_PREFIX: &str = "UP_";

const SECTIONS: &[&str] = &["poller", "unifi", "influxdb", "prometheus"];

/// The first readable path in a comma-separated list.
pub fn find_config(list: &str) -> Result<PathBuf, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .find(|p| std::fs::File::open(p).is_ok())
        .ok_or_else(|| ConfigError::NoConfigFile {
            paths: list.to_owned(),
        })
}

/// Find the first readable file in `list` and load it.
pub fn load(list: &str) -> Result<(PathBuf, Settings), ConfigError> {
    let path = find_config(list)?;
    let settings = load_file(&path)?;
    Ok((path, settings))
}

/// Load one file with environment overrides applied.
pub fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(file_provider(path)?)
        .merge(env_provider());
    Ok(figment.extract()?)
}

/// Defaults plus environment, for running without any file.
pub fn load_env() -> Result<Settings, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(env_provider());
    Ok(figment.extract()?)
}

fn file_provider(path: &Path) -> Result<Figment, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let figment = Figment::new();
    Ok(match ext.as_str() {
        "json" => figment.merge(Json::file(path)),
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "xml" => figment.merge(Serialized::defaults(read_xml(path)?)),
        _ => figment.merge(Toml::file(path)),
    })
}

fn read_xml(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    quick_xml::de::from_str(&text).map_err(|source| ConfigError::Xml {
        path: path.display().to_string(),
        source,
    })
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| env_key(key.as_str()).into())
}

/// Map an environment key (prefix removed) to a config path.
///
/// The first `_` separates the section; the rest is the field name, which
/// may itself contain underscores. `UNIFI_DEFAULTS_*` addresses the
/// controller template. Keys outside the known sections pass through.
pub fn env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    let Some((section, field)) = key.split_once('_') else {
        return key;
    };

    let section = match section {
        "influx" => "influxdb",
        "prom" => "prometheus",
        other => other,
    };
    if !SECTIONS.contains(&section) {
        return key;
    }

    if section == "unifi" {
        for template in ["defaults_", "default_"] {
            if let Some(field) = field.strip_prefix(template) {
                return format!("unifi.defaults.{field}");
            }
        }
    }

    format!("{section}.{field}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_keep_underscored_fields() {
        assert_eq!(env_key("INFLUXDB_URL"), "influxdb.url");
        assert_eq!(env_key("PROMETHEUS_HTTP_LISTEN"), "prometheus.http_listen");
        assert_eq!(env_key("POLLER_MAX_ERRORS"), "poller.max_errors");
        assert_eq!(env_key("UNIFI_DYNAMIC"), "unifi.dynamic");
        assert_eq!(env_key("UNIFI_DEFAULTS_SAVE_SITES"), "unifi.defaults.save_sites");
        assert_eq!(env_key("UNIFI_DEFAULT_PASS"), "unifi.defaults.pass");
        assert_eq!(env_key("INFLUX_DB"), "influxdb.db");
    }

    #[test]
    fn unknown_keys_pass_through() {
        assert_eq!(env_key("CONFIG_FILE"), "config_file");
        assert_eq!(env_key("DEBUG"), "debug");
    }

    #[test]
    fn first_readable_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("up.conf");
        std::fs::write(&real, "").unwrap();

        let list = format!("/nonexistent/up.conf, {}", real.display());
        assert_eq!(find_config(&list).unwrap(), real);
        assert!(matches!(
            find_config("/nonexistent/a.conf,/nonexistent/b.conf"),
            Err(ConfigError::NoConfigFile { .. })
        ));
    }
}
