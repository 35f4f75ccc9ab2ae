// unpoller-prom: Prometheus pull output
//
// Serves `/metrics` and `/scrape`. Each request collects a fresh bundle,
// exports it into a new registry and encodes it in the text format.

mod clients;
pub mod config;
mod descs;
mod device;
mod export;
pub mod output;
pub mod report;
pub mod scrape;
pub mod server;
mod site;
mod uap;
mod udm;
mod usg;
mod usw;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::PromConfig;
pub use output::{PLUGIN_NAME, PromOutput};
pub use report::{Counts, Report};
pub use scrape::{Scraped, scrape};
pub use server::{APP_NAME, AppState, router};
