// Command-line flags
//
// Everything else comes from the config file and `UP_` variables; these
// flags only pick the file and override the log switches.

use clap::Parser;

use unpoller_config::DEFAULT_CONFIG_PATH;

/// unpoller -- UniFi controller metrics for InfluxDB and Prometheus
#[derive(Debug, Parser)]
#[command(
    name = "unpoller",
    version,
    about = "Poll UniFi controllers and export their metrics",
    long_about = "Polls one or more UniFi controllers for site, client, device, DPI and \
        event data, then writes it to InfluxDB on an interval, serves it to \
        Prometheus, or both."
)]
pub struct Cli {
    /// Config file; a comma-separated list tries each until one is readable
    #[arg(long, short = 'c', env = "UP_CONFIG_FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Print raw controller JSON and exit: d|device, c|client or 'other <path>',
    /// with an optional :N controller index, e.g. 'd:1'
    #[arg(long, short = 'j', value_name = "SPEC")]
    pub dumpjson: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Only log errors
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Verify controller TLS certificates
    #[arg(long)]
    pub verify_ssl: bool,
}
