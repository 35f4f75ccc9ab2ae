#![allow(clippy::unwrap_used)]
// Integration tests for config loading across formats and the environment.
//
// Every test runs inside a figment `Jail` so environment changes stay
// isolated from the rest of the suite.

use std::path::Path;
use std::time::Duration;

use figment::Jail;
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use unpoller_config::{ConfigError, Mode, Settings, load, load_env, load_file};

// ── Helpers ─────────────────────────────────────────────────────────

fn load_in_jail(name: &str) -> Result<Settings, figment::Error> {
    load_file(Path::new(name)).map_err(|e| figment::Error::from(e.to_string()))
}

const TOML: &str = r#"
[poller]
debug = true
mode = "both"

[unifi.defaults]
user = "reader"
pass = "shared"
save_dpi = true

[[unifi.controller]]
url = "https://a.local:8443"
role = "office"

[[unifi.controller]]
url = "https://b.local"
sites = ["default", "lab"]
save_dpi = false

[influxdb]
url = "http://influx:8086"
db = "metrics"
interval = "2m"
dead_ports = true

[prometheus]
http_listen = ":9131"
namespace = "unpoller"
report_errors = true
"#;

// ── Formats ─────────────────────────────────────────────────────────

#[test]
fn toml_file_with_controller_alias() {
    Jail::expect_with(|jail| {
        jail.create_file("up.conf", TOML)?;
        let settings = load_in_jail("up.conf")?;

        assert!(settings.poller.debug);
        assert_eq!(settings.mode().unwrap(), Mode::Both);

        let unifi = settings.unifi_config().unwrap();
        assert_eq!(unifi.controllers.len(), 2);
        assert_eq!(unifi.controllers[0].role(), "office");
        assert_eq!(unifi.controllers[0].user, "reader");
        assert!(unifi.controllers[0].save_dpi);
        assert_eq!(unifi.controllers[1].sites, ["default", "lab"]);
        assert!(!unifi.controllers[1].save_dpi);
        assert_eq!(unifi.controllers[1].pass.expose_secret(), "shared");

        let influx = settings.influx_config().unwrap();
        assert_eq!(influx.db, "metrics");
        assert_eq!(influx.interval(), Duration::from_secs(120));
        assert!(influx.dead_ports);

        let prom = settings.prom_config();
        assert_eq!(prom.bind_addr(), "0.0.0.0:9131");
        assert!(prom.report_errors);
        Ok(())
    });
}

#[test]
fn json_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "up.json",
            r#"{
                "poller": {"mode": "prometheus"},
                "unifi": {"controllers": [{"url": "https://c.local", "save_ids": true}]},
                "prometheus": {"namespace": "my-poller"}
            }"#,
        )?;
        let settings = load_in_jail("up.json")?;

        assert_eq!(settings.mode().unwrap(), Mode::Pull);
        let unifi = settings.unifi_config().unwrap();
        assert!(unifi.controllers[0].save_ids);
        assert_eq!(settings.prom_config().namespace(), "my_poller");
        Ok(())
    });
}

#[test]
fn yaml_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "up.yml",
            "poller:\n  quiet: true\nunifi:\n  dynamic: true\ninfluxdb:\n  disable: true\n",
        )?;
        let settings = load_in_jail("up.yml")?;

        assert!(settings.poller.quiet);
        assert!(settings.influx_config().unwrap().disable);
        let unifi = settings.unifi_config().unwrap();
        assert!(unifi.dynamic);
        assert!(unifi.controllers.is_empty());
        Ok(())
    });
}

#[test]
fn xml_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "up.xml",
            r"<poller>
                <poller><mode>influxlambda</mode></poller>
                <unifi>
                  <defaults><user>xml-user</user></defaults>
                  <controllers><url>https://x.local</url><save_events>true</save_events></controllers>
                </unifi>
                <influxdb><db>xmldb</db><interval>45s</interval></influxdb>
              </poller>",
        )?;
        let settings = load_in_jail("up.xml")?;

        assert_eq!(settings.mode().unwrap(), Mode::Lambda);
        let unifi = settings.unifi_config().unwrap();
        assert_eq!(unifi.controllers[0].url, "https://x.local");
        assert_eq!(unifi.controllers[0].user, "xml-user");
        assert!(unifi.controllers[0].save_events);

        let influx = settings.influx_config().unwrap();
        assert_eq!(influx.db, "xmldb");
        assert_eq!(influx.interval(), Duration::from_secs(45));
        Ok(())
    });
}

#[test]
fn malformed_xml_is_an_xml_error() {
    Jail::expect_with(|jail| {
        jail.create_file("up.xml", "<poller><unifi><dynamic>maybe</dynamic></unifi></poller>")?;
        let result = load_file(Path::new("up.xml"));
        assert!(matches!(result, Err(ConfigError::Xml { .. })), "{:?}", result.err());
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file("up.conf", "[influxdb\nurl = ")?;
        let result = load_file(Path::new("up.conf"));
        assert!(matches!(result, Err(ConfigError::Figment(_))), "{:?}", result.err());
        Ok(())
    });
}

// ── Environment ─────────────────────────────────────────────────────

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("up.conf", TOML)?;
        jail.set_env("UP_INFLUXDB_URL", "http://env-influx:8086");
        jail.set_env("UP_PROMETHEUS_HTTP_LISTEN", "127.0.0.1:9999");
        jail.set_env("UP_POLLER_MAX_ERRORS", "5");
        jail.set_env("UP_UNIFI_DEFAULTS_USER", "env-user");
        jail.set_env("UP_UNIFI_DEFAULT_SITES", "[one, two]");
        jail.set_env("UP_POLLER_MODE", "exporter");

        let settings = load_in_jail("up.conf")?;
        assert_eq!(settings.mode().unwrap(), Mode::Pull);

        let influx = settings.influx_config().unwrap();
        assert_eq!(influx.url, "http://env-influx:8086");
        assert_eq!(influx.max_errors, 5);
        assert_eq!(settings.prom_config().bind_addr(), "127.0.0.1:9999");

        let unifi = settings.unifi_config().unwrap();
        assert_eq!(unifi.controllers[0].user, "env-user");
        assert_eq!(unifi.controllers[1].sites, ["default", "lab"]);
        assert_eq!(unifi.controllers[0].sites, ["one", "two"]);
        Ok(())
    });
}

#[test]
fn environment_alone_without_a_file() {
    Jail::expect_with(|jail| {
        jail.set_env("UP_UNIFI_DEFAULTS_URL", "https://env.local:8443");
        jail.set_env("UP_UNIFI_DEFAULTS_SAVE_SITES", "false");

        let settings = load_env().map_err(|e| figment::Error::from(e.to_string()))?;
        let unifi = settings.unifi_config().unwrap();
        assert_eq!(unifi.controllers.len(), 1);
        assert_eq!(unifi.controllers[0].url, "https://env.local:8443");
        assert!(!unifi.controllers[0].save_sites);
        Ok(())
    });
}

// ── Secrets and paths ───────────────────────────────────────────────

#[test]
fn file_secrets_are_resolved() {
    Jail::expect_with(|jail| {
        jail.create_file("unifi.pass", "from-file\n")?;
        jail.create_file("influx.pass", "  influx-secret  ")?;
        let dir = jail.directory().display().to_string();
        jail.create_file(
            "up.conf",
            &format!(
                "[unifi.defaults]\npass = \"file://{dir}/unifi.pass\"\n\n\
                 [influxdb]\npass = \"file://{dir}/influx.pass\"\n"
            ),
        )?;

        let settings = load_in_jail("up.conf")?;
        let unifi = settings.unifi_config().unwrap();
        assert_eq!(unifi.controllers[0].pass.expose_secret(), "from-file");
        assert_eq!(unifi.defaults.pass.expose_secret(), "from-file");

        let influx = settings.influx_config().unwrap();
        assert_eq!(influx.pass.expose_secret(), "influx-secret");
        Ok(())
    });
}

#[test]
fn missing_secret_file_fails_the_build() {
    Jail::expect_with(|jail| {
        jail.create_file("up.conf", "[influxdb]\npass = \"file:///nonexistent/secret\"\n")?;
        let settings = load_in_jail("up.conf")?;

        let result = settings.influx_config();
        assert!(matches!(result, Err(ConfigError::SecretFile { .. })), "{:?}", result.err());
        Ok(())
    });
}

#[test]
fn load_picks_first_readable_path() {
    Jail::expect_with(|jail| {
        jail.create_file("second.conf", "[poller]\nquiet = true\n")?;

        let (path, settings) = load("/nonexistent/first.conf,second.conf")
            .map_err(|e| figment::Error::from(e.to_string()))?;
        assert_eq!(path, Path::new("second.conf"));
        assert!(settings.poller.quiet);
        Ok(())
    });
}

#[test]
fn debug_output_hides_passwords() {
    Jail::expect_with(|jail| {
        jail.create_file("up.conf", "[unifi.defaults]\npass = \"hunter2\"\n")?;
        let settings = load_in_jail("up.conf")?;
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"), "{rendered}");
        Ok(())
    });
}
