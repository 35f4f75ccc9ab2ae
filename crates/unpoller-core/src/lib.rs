// unpoller-core: Collection pipeline between UniFi controllers and metric sinks.
//
// Inputs gather `Metrics` and `Events`; outputs run for the life of the
// process and pull data through the `Collect` capability the `Poller`
// hands them.

pub mod collect;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod registry;
pub mod unifi;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collect::{Collect, Input, Output};
pub use error::PollerError;
pub use filter::Filter;
pub use metrics::{Collected, Events, LogEntry, Metrics, append_metrics};
pub use registry::Poller;
pub use unifi::{ControllerConfig, UnifiConfig, UnifiInput};
