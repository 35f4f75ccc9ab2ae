// CLI error types with miette diagnostics
//
// Configuration and usage problems exit 2; anything that stops the poller
// at runtime exits 1.

use miette::Diagnostic;
use thiserror::Error;

use unpoller_config::ConfigError;
use unpoller_core::PollerError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(unpoller::config),
        help(
            "Check the file named by --config (default /etc/unpoller/up.conf) \
             and any UP_ environment variables."
        )
    )]
    Config(#[from] ConfigError),

    // ── Usage ────────────────────────────────────────────────────────
    #[error("invalid --dumpjson value '{spec}': {reason}")]
    #[diagnostic(
        code(unpoller::dumpjson),
        help("Use d, c or 'other /api/path', optionally with a controller index: 'd:1'.")
    )]
    DumpSpec { spec: String, reason: String },

    // ── Runtime ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(unpoller::poller))]
    Poller(#[from] PollerError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::DumpSpec { .. } => exit_code::USAGE,
            Self::Poller(_) => exit_code::GENERAL,
        }
    }
}
