//! Router construction and server startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::error;

use crate::api::{self, AppState};
use crate::ws;

/// Assemble the router: the WebSocket endpoint, the REST API, a permissive
/// CORS layer for a frontend dev server on another port, and (in production
/// mode) the static frontend export as the fallback.
pub fn build_router(app: AppState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/state", get(api::get_state))
        .route("/api/chat", post(api::post_chat))
        .with_state(app)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Bind the listener and serve on a background task.
///
/// Returns the bound address (useful with port 0). A serve-loop failure
/// after startup is logged; binding failures are the caller's to handle.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> Result<SocketAddr, String> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("failed to read bound address: {e}"))?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("web server exited: {e}");
        }
    });

    Ok(addr)
}
