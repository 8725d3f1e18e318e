//! HTTP server and the dataselect protocol adapter.
//!
//! One data endpoint, `GET /fdsnws/dataselect/1/query`, plus a landing
//! page, a version endpoint, a health probe, and static file serving.
//! Each request is validated, run against the archive, and rendered as
//! either a miniSEED attachment or the uniform HTML error envelope.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, Method},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Duration;
use serde::Serialize;
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::archive::decode::MiniSeed2Decoder;
use crate::archive::Archive;
use crate::config::ServiceConfig;
use crate::error::FdsnError;
use crate::query::RawQuery;

/// Content type of the binary response body.
const MSEED_CONTENT_TYPE: &str = "application/vnd.fdsn.mseed";

/// Application state shared across handlers. Read-only after startup, so
/// request handling needs no locks.
pub struct AppState {
    pub archive: Archive,
    pub max_timerange: Duration,
}

/// Build the service state and run the HTTP server until SIGINT/SIGTERM.
pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        archive: Archive::new(&config, Box::new(MiniSeed2Decoder)),
        max_timerange: Duration::hours(config.dataselect.maxqueryhours),
    });

    let app = router(state, &config);

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host {:?}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "dataselect service listening");

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let shutdown = async move {
        tokio::select! {
            _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

fn router(state: Arc<AppState>, config: &ServiceConfig) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/fdsnws/dataselect/1/version", get(version_handler))
        .route(
            "/fdsnws/dataselect/1/query",
            get(query_handler).fallback(unsupported_method_handler),
        )
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Embedded landing page with a query form.
const INDEX_HTML: &str = include_str!("static/index.html");

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /fdsnws/dataselect/1/version - service version as plain text.
async fn version_handler() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// GET /api/health - liveness probe for deployment tooling.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /fdsnws/dataselect/1/query - the dataselect data endpoint.
async fn query_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(raw): Query<RawQuery>,
) -> Response {
    let query = match raw.validate(state.max_timerange) {
        Ok(query) => query,
        Err(err) => {
            tracing::info!(status = %err.status, reason = %err.message, "Rejected dataselect query");
            return err.into_page(&uri);
        }
    };

    let data = state
        .archive
        .query(&query.channel, &query.window);

    tracing::info!(
        net = %query.channel.net,
        sta = %query.channel.sta,
        loc = %query.channel.loc,
        cha = %query.channel.cha,
        start = %query.window.start,
        end = %query.window.end,
        bytes = data.len(),
        "Dataselect query complete"
    );

    if data.is_empty() {
        return FdsnError::no_data(query.nodata.status()).into_page(&uri);
    }

    let filename = format!(
        "{}_{}_{}_{}_{}.mseed",
        query.channel.net,
        query.channel.sta,
        query.channel.loc,
        query.channel.cha,
        query.window.start.format("%y-%m-%dT%H%M%S"),
    );
    (
        [
            (header::CONTENT_TYPE, MSEED_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response()
}

/// Non-GET verbs on the query endpoint. The archive is read-only, so every
/// other verb is a 405 with an `Allow: GET` header.
async fn unsupported_method_handler(OriginalUri(uri): OriginalUri, method: Method) -> Response {
    tracing::info!(%method, "Unsupported method on query endpoint");
    FdsnError::method_not_allowed(&method).into_page(&uri)
}
