//! HTTP server for browser-based access to Cyclebot.
//!
//! Serves the relay over a WebSocket at `/ws`, the index page at `/` and
//! static assets under `/static`.

mod routes;
mod state;
mod websocket;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub use state::SharedState;

/// Where and what to serve.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Parse `host:port` into a socket address.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{}:{} ({})", self.host, self.port, e)))
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind HTTP server to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Handle to a running HTTP server.
pub struct HttpServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl HttpServerHandle {
    /// Address the server actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Check if the server is running.
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Stop the server gracefully and wait for it to finish.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("HTTP server task failed: {}", e);
            }
        }
    }
}

/// Build the router.
pub fn router(state: Arc<SharedState>) -> Router {
    let static_dir = state.static_dir.clone();

    let mut app = Router::new()
        .route("/", get(routes::index_handler))
        .route("/ws", get(websocket::ws_handler));

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .with_state(state)
}

/// Bind and start the HTTP server on the current tokio runtime.
///
/// Binding happens before this returns, so address errors surface here.
/// Returns a handle that can be used to stop the server.
pub async fn start(state: Arc<SharedState>, config: &ServerConfig) -> Result<HttpServerHandle, ServerError> {
    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let app = router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    log::info!("HTTP server listening on http://{}", local_addr);

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                log::info!("HTTP server shutting down");
            })
            .await;
        if let Err(e) = result {
            log::error!("HTTP server error: {}", e);
        }
    });

    Ok(HttpServerHandle {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ============================================================================
// TESTS
// ============================================================================
