// unpoller-config: Configuration for the poller and its plugins
//
// Reads TOML, JSON, YAML or XML files, layers `UP_` environment overrides
// on top, and builds the runtime config each plugin consumes.

pub mod error;
pub mod load;
pub mod mode;
pub mod secret;
pub mod settings;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::ConfigError;
pub use load::{DEFAULT_CONFIG_PATH, ENV_PREFIX, env_key, find_config, load, load_env, load_file};
pub use mode::Mode;
pub use secret::resolve_secret;
pub use settings::{
    ControllerSection, InfluxSection, PollerSection, PromSection, Settings, UnifiSection,
};
