// HTTP routes
//
// `/metrics` scrapes every configured controller, `/scrape` one controller
// picked by URL or alias, and `/` answers with the application name.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;

use unpoller_core::{Collect, Filter};

use crate::config::PromConfig;
use crate::output::PLUGIN_NAME;
use crate::scrape::scrape;

pub const APP_NAME: &str = "unpoller";

/// Shared state for axum handlers.
pub struct AppState {
    pub collect: Arc<dyn Collect>,
    pub config: PromConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScrapeParams {
    input: String,
    path: String,
    role: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/metrics", get(metrics_handler))
        .route("/scrape", get(scrape_handler))
        .with_state(state)
}

/// Bind `listener` and serve until the server fails.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let local_addr = listener.local_addr().context("getting local address")?;
    tracing::debug!(addr = %local_addr, "prometheus exporter listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .with_context(|| format!("serving on {local_addr}"))
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("listening on {addr}"))
}

/// GET / - application name.
async fn index_handler() -> &'static str {
    APP_NAME
}

/// GET /metrics - every configured source.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    respond(&state, &Filter::skip_ids()).await
}

/// GET /scrape?input=&path=&role= - one source.
async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    if params.input.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "'input' parameter must be set (try unifi)",
        )
            .into_response();
    }

    if params.path.is_empty() && params.role.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "'role' or 'path' parameter must be set",
        )
            .into_response();
    }

    let filter = Filter {
        name: params.input,
        path: params.path,
        role: params.role,
        skip: true,
        ..Filter::default()
    };
    respond(&state, &filter).await
}

async fn respond(state: &AppState, filter: &Filter) -> Response {
    match scrape(state.collect.as_ref(), &state.config, filter).await {
        Ok(scraped) => {
            let status = if scraped.error.is_some() && state.config.report_errors {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };

            (
                status,
                [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                scraped.body,
            )
                .into_response()
        }
        Err(err) => {
            state
                .collect
                .log_errorf(PLUGIN_NAME, format_args!("{err:#}"));
            (StatusCode::INTERNAL_SERVER_ERROR, "encoding error").into_response()
        }
    }
}
