// ── Poller error types ──
//
// Errors surfaced by the plugin registries and the UniFi input. Controller
// failures keep the underlying `unpoller_api::Error` as their source and
// name the failing call and controller so one log line tells the story.

use thiserror::Error;

/// Unified error type for the collection pipeline.
#[derive(Debug, Error)]
pub enum PollerError {
    // ── Registry errors ──────────────────────────────────────────────
    #[error("no output plugins imported")]
    NoOutputs,

    #[error("all output plugins have stopped, or none enabled")]
    AllOutputsStopped,

    #[error("output plugin {plugin} failed: {message}")]
    Output { plugin: String, message: String },

    // ── Controller errors ────────────────────────────────────────────
    #[error("no unifi controllers defined for unifi input")]
    NoControllers,

    #[error("authenticating to {url}: {source}")]
    ControllerAuth {
        url: String,
        #[source]
        source: unpoller_api::Error,
    },

    /// A controller call failed; rendered as `unifi.GetClients(url): err`.
    #[error("{call}({url}): {source}")]
    Collection {
        call: &'static str,
        url: String,
        #[source]
        source: unpoller_api::Error,
    },

    // ── Filter errors ────────────────────────────────────────────────
    #[error("filter path requested but dynamic lookups disabled")]
    DynamicDisabled,

    #[error("scrape filter match failed, and filter path invalid: {path:?}")]
    ScrapeFilterMatchFailed { path: String },

    #[error("controller number not found")]
    ControllerIndexOutOfRange,

    #[error("must provide filter: devices, clients, other")]
    UnknownKind,

    // ── Aggregates ───────────────────────────────────────────────────
    #[error("{}", join_messages(.0))]
    Joined(Vec<PollerError>),
}

impl PollerError {
    /// Fold several errors into one: `None` when empty, the error itself
    /// when alone, `Joined` otherwise.
    pub fn join(mut errors: Vec<PollerError>) -> Option<PollerError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Joined(errors)),
        }
    }

    pub(crate) fn collection(call: &'static str, url: &str) -> impl FnOnce(unpoller_api::Error) -> Self {
        let url = url.to_owned();
        move |source| Self::Collection { call, url, source }
    }

    pub(crate) fn auth(url: &str) -> impl FnOnce(unpoller_api::Error) -> Self {
        let url = url.to_owned();
        move |source| Self::ControllerAuth { url, source }
    }
}

fn join_messages(errors: &[PollerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
