//! Static server for the output tree with live reload.
//!
//! Files are served from disk by `ServeDir`, so a directory request gets its
//! `index.html` and paths escaping the root are refused. HTML responses get
//! the reload client injected before `</body>`; the client listens on the SSE
//! endpoint and reloads the page after every successful rebuild.

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::dev::{DevEvent, SharedState};
use crate::error::{CliError, Result};

pub const EVENTS_PATH: &str = "/__spout/events";
pub const RELOAD_SCRIPT_PATH: &str = "/__spout/reload.js";

const RELOAD_SCRIPT: &str = include_str!("../../assets/reload-client.js");

/// Pages larger than this are served without the reload client.
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

pub struct DevServer {
    root: PathBuf,
    state: SharedState,
}

impl DevServer {
    /// Serve `root` (the output directory) and publish reloads from `state`.
    pub fn new(root: impl Into<PathBuf>, state: SharedState) -> Self {
        Self {
            root: root.into(),
            state,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route(EVENTS_PATH, get(handle_sse))
            .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
            .fallback_service(ServeDir::new(&self.root))
            .layer(middleware::map_response(inject_into_html))
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Bind `host:port`.
    pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
        TcpListener::bind((host, port))
            .await
            .map_err(|e| CliError::Server(format!("failed to bind {}:{}: {}", host, port, e)))
    }

    /// Run until the listener fails.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();
        if let Ok(addr) = listener.local_addr() {
            tracing::debug!("serving {} on http://{}", self.root.display(), addr);
        }
        axum::serve(listener, router)
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    tracing::debug!("reload client {} connected", id);
    state.broadcast(&DevEvent::ClientConnected { id });

    let stream =
        ReceiverStream::new(rx).map(|data| Ok::<_, Infallible>(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

async fn inject_into_html(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!("could not buffer page for reload injection: {}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::ETAG);
    parts.headers.remove(header::LAST_MODIFIED);
    parts
        .headers
        .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-cache"));
    Response::from_parts(parts, Body::from(inject_reload_script(&bytes)))
}

/// Insert the reload client before the last `</body>`, or append it.
///
/// Works on raw bytes so pages in any ASCII-compatible encoding pass through
/// unchanged.
pub fn inject_reload_script(html: &[u8]) -> Vec<u8> {
    let tag = format!(r#"<script src="{}"></script>"#, RELOAD_SCRIPT_PATH);
    let pos = html
        .windows(BODY_CLOSE.len())
        .rposition(|window| window.eq_ignore_ascii_case(BODY_CLOSE))
        .unwrap_or(html.len());

    let mut out = Vec::with_capacity(html.len() + tag.len());
    out.extend_from_slice(&html[..pos]);
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(&html[pos..]);
    out
}

const BODY_CLOSE: &[u8] = b"</body>";
