// unpoller-influx: InfluxDB push output
//
// Every interval, turns the poller's metrics and events into InfluxDB v1
// line protocol and writes them in one batch.

mod batch;
mod clients;
pub mod config;
mod devices;
pub mod error;
mod events;
pub mod output;
pub mod point;
pub mod report;
mod site;
mod uap;
mod udm;
mod usg;
mod usw;
pub mod writer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::build_report;
pub use config::InfluxConfig;
pub use error::InfluxError;
pub use output::{InfluxOutput, PLUGIN_NAME};
pub use point::{FieldValue, Point};
pub use report::Report;
pub use writer::InfluxWriter;
