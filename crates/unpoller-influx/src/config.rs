// InfluxDB output configuration
//
// Runtime view of the `[influxdb]` section, built by the config crate.

use std::time::Duration;

use secrecy::SecretString;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8086";
pub const DEFAULT_USER: &str = "unifipoller";
pub const DEFAULT_PASS: &str = "unifipoller";
pub const DEFAULT_DB: &str = "unifi";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
pub const MINIMUM_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub disable: bool,
    pub url: String,
    pub user: String,
    pub pass: SecretString,
    pub db: String,
    /// Raw configured cadence; read it through [`InfluxConfig::interval`].
    pub interval: Duration,
    pub verify_ssl: bool,
    /// Record switch ports that are down or disabled.
    pub dead_ports: bool,
    /// Emit per-application DPI TOTAL records alongside the category ones.
    pub dpi_app_totals: bool,
    /// Stop after this many consecutive failed writes; 0 never stops.
    pub max_errors: u32,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            disable: false,
            url: DEFAULT_URL.into(),
            user: DEFAULT_USER.into(),
            pass: SecretString::from(DEFAULT_PASS.to_owned()),
            db: DEFAULT_DB.into(),
            interval: DEFAULT_INTERVAL,
            verify_ssl: false,
            dead_ports: false,
            dpi_app_totals: false,
            max_errors: 0,
        }
    }
}

impl InfluxConfig {
    /// The effective tick period: unset means 30s, anything shorter than
    /// 10s is raised to 10s, and the result is rounded to whole seconds.
    pub fn interval(&self) -> Duration {
        if self.interval.is_zero() {
            return DEFAULT_INTERVAL;
        }
        let clamped = self.interval.max(MINIMUM_INTERVAL);
        let mut secs = clamped.as_secs();
        if clamped.subsec_millis() >= 500 {
            secs += 1;
        }
        Duration::from_secs(secs)
    }

    /// Event records older than this are dropped from a batch.
    pub fn max_event_age(&self) -> Duration {
        self.interval() + Duration::from_secs(1)
    }
}
