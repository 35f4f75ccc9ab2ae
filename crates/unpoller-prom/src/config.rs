// Prometheus output configuration
//
// Runtime view of the `[prometheus]` section, built by the config crate.

pub const DEFAULT_HTTP_LISTEN: &str = "0.0.0.0:9130";
pub const DEFAULT_NAMESPACE: &str = "unifipoller";
pub const DEFAULT_BUFFER: usize = 50;

#[derive(Debug, Clone)]
pub struct PromConfig {
    pub disable: bool,
    pub http_listen: String,
    /// Metric name prefix; read it through [`PromConfig::namespace`].
    pub namespace: String,
    /// Answer a scrape with HTTP 500 when the metric fetch failed.
    pub report_errors: bool,
    /// Capacity of the channel between the exporters and the emitter.
    pub buffer: usize,
}

impl Default for PromConfig {
    fn default() -> Self {
        Self {
            disable: false,
            http_listen: DEFAULT_HTTP_LISTEN.into(),
            namespace: DEFAULT_NAMESPACE.into(),
            report_errors: false,
            buffer: DEFAULT_BUFFER,
        }
    }
}

impl PromConfig {
    /// The namespace with `-` turned into `_` and outer underscores
    /// trimmed. An unset namespace falls back to the default.
    pub fn namespace(&self) -> String {
        if self.namespace.is_empty() {
            return DEFAULT_NAMESPACE.into();
        }
        self.namespace.replace('-', "_").trim_matches('_').to_owned()
    }

    /// The listen address, accepting the `:port` shorthand.
    pub fn bind_addr(&self) -> String {
        let addr = if self.http_listen.is_empty() {
            DEFAULT_HTTP_LISTEN
        } else {
            &self.http_listen
        };
        if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_owned()
        }
    }

    pub fn buffer(&self) -> usize {
        if self.buffer == 0 { DEFAULT_BUFFER } else { self.buffer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_is_sanitized() {
        let config = PromConfig {
            namespace: "_unifi-poller_".into(),
            ..PromConfig::default()
        };
        assert_eq!(config.namespace(), "unifi_poller");

        let config = PromConfig {
            namespace: String::new(),
            ..PromConfig::default()
        };
        assert_eq!(config.namespace(), "unifipoller");
    }

    #[test]
    fn port_shorthand_binds_all_interfaces() {
        let config = PromConfig {
            http_listen: ":9131".into(),
            ..PromConfig::default()
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:9131");
        assert_eq!(PromConfig::default().bind_addr(), "0.0.0.0:9130");
    }

    #[test]
    fn zero_buffer_uses_default() {
        let config = PromConfig {
            buffer: 0,
            ..PromConfig::default()
        };
        assert_eq!(config.buffer(), 50);
    }
}
