//! Browser-based chat front end for tracedeck agent engines.
//!
//! `tracedeck-web` provides an axum web server that exposes a WebSocket
//! endpoint for real-time chat updates and a small REST API for clients
//! without a socket. It is UI-framework agnostic: any WebSocket client can
//! drive a conversation.
//!
//! # Quick start
//!
//! ```ignore
//! use tracedeck_web::{WebConfig, spawn_web};
//! use tracedeck_web::state::ChatState;
//! use std::sync::{Arc, Mutex};
//!
//! let chat_state = Arc::new(Mutex::new(ChatState::default()));
//! let (ws_tx, _) = tokio::sync::broadcast::channel(256);
//!
//! let config = WebConfig::default();
//! let (addr, mut chat_rx) = spawn_web(chat_state, ws_tx, config).await?;
//! println!("Chat UI: http://{addr}");
//!
//! // Read user messages sent from the browser:
//! while let Some(msg) = chat_rx.recv().await {
//!     println!("User said: {msg}");
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Turn loop ──WsMessage──▶ broadcast channel ──▶ WebSocket clients
//!                                                      ▲
//!     Arc<Mutex<ChatState>> ◀── /api/state, /api/chat ─┘
//! ```
//!
//! The turn loop (see the binary in `main.rs`) owns the conversation: it
//! consumes user messages from the mpsc channel returned by [`spawn_web`],
//! runs each turn through a [`TurnOrchestrator`](tracedeck::turn::TurnOrchestrator),
//! and publishes the outcome to both the shared state and the broadcast
//! channel. Serializing turns through one consumer keeps artifact
//! attribution unambiguous.

mod api;
pub mod broadcast;
mod server;
pub mod snapshot;
pub mod state;
mod ws;

pub use broadcast::WsMessage;
pub use snapshot::ChatSnapshot;
pub use state::ChatState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Path to a static frontend export directory (for production mode).
    ///
    /// If `None`, only API/WS endpoints are served — the frontend runs
    /// separately (e.g., a dev server on port 3000).
    pub static_dir: Option<PathBuf>,
    /// Maximum WebSocket broadcast channel capacity. Default: 256.
    ///
    /// Clients that fall behind by this many messages receive a fresh
    /// state snapshot to resynchronize.
    pub broadcast_capacity: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
            broadcast_capacity: 256,
        }
    }
}

/// Spawn the web server on a Tokio task.
///
/// Returns the bound address and a receiver for chat messages sent from the
/// browser (via `POST /api/chat` or `{"type":"chat"}` WebSocket messages).
/// Read from the receiver in your turn loop to drive conversation turns.
/// Fails if the bind address is unavailable.
///
/// The server runs until the Tokio runtime shuts down.
///
/// # Arguments
///
/// * `chat_state` — Shared chat state (the turn loop writes, handlers read).
/// * `broadcast_tx` — Sender half of the WebSocket broadcast channel. The
///   turn loop publishes turn outcomes on the same sender.
/// * `config` — Server configuration.
pub async fn spawn_web(
    chat_state: Arc<Mutex<ChatState>>,
    broadcast_tx: tokio::sync::broadcast::Sender<WsMessage>,
    config: WebConfig,
) -> Result<(SocketAddr, tokio::sync::mpsc::Receiver<String>), String> {
    let (chat_tx, chat_rx) = tokio::sync::mpsc::channel(32);
    let app = api::AppState {
        chat_state,
        chat_tx,
        broadcast_tx,
    };
    let router = server::build_router(app, config.static_dir);
    let addr = server::start_server(router, config.bind_addr).await?;
    Ok((addr, chat_rx))
}
