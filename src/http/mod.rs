//! Loopback file server with single byte-range support.

pub mod idle;
pub mod media;
pub mod state;

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::http::idle::IdleTimeoutListener;
use crate::http::state::ServerState;

/// A connection with no traffic in either direction for this long is closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/{*path}",
            get(media::serve_file_get).head(media::serve_file_head),
        )
        // Request spans and events are DEBUG level: silent under the default filter.
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the server socket on 127.0.0.1 only.
pub async fn bind_loopback(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).await
}

/// Serve `app` on `listener` as a background task until `shutdown_rx` fires.
///
/// Each connection is driven by its own task, so a long transfer never blocks
/// other requests, and is dropped after `idle_timeout` without traffic.
/// Server-level failures are logged, never propagated.
pub fn spawn_server(
    listener: TcpListener,
    app: Router,
    idle_timeout: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        axum::serve(IdleTimeoutListener::new(listener, idle_timeout), app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .unwrap_or_else(|e| tracing::error!("HTTP server error: {}", e));
    })
}
