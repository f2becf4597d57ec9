//! HTTP surface: the `/logs/stream` endpoint and the server loop.

use crate::config::{ServerConfig, TailOptions};
use crate::error::{Error, Result};
use crate::stream::LogStream;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use bytes::Bytes;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Path of the log streaming endpoint.
pub const STREAM_PATH: &str = "/logs/stream";

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    log_file: Arc<PathBuf>,
    tail: Arc<TailOptions>,
}

impl AppState {
    pub fn new(log_file: PathBuf, tail: TailOptions) -> Self {
        Self {
            log_file: Arc::new(log_file),
            tail: Arc::new(tail),
        }
    }
}

impl From<&ServerConfig> for AppState {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.log_file.clone(), config.tail.clone())
    }
}

/// Builds the router with the stream endpoint and a health check.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(STREAM_PATH, any(stream_logs))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Streams new lines of the log file as Server-Sent Events.
///
/// Every request gets its own session. The body ends when the session does,
/// and a client that goes away drops the body, which stops the session.
async fn stream_logs(State(state): State<AppState>) -> Response {
    let events = LogStream::new(state.log_file.as_path(), (*state.tail).clone());
    let body = events.map(|event| Ok::<Bytes, Infallible>(event.encode()));

    (
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

async fn health() -> &'static str {
    "OK"
}

/// Binds the configured port and serves until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;

    info!("Starting log streaming server on {addr}");
    info!("Endpoint: http://localhost:{}{STREAM_PATH}", config.port);
    info!(path = %config.log_file.display(), "Tailing log file");

    let app = create_router(AppState::from(&config));
    axum::serve(listener, app).await.map_err(Error::Serve)
}
