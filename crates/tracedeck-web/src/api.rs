//! REST API endpoint handlers.
//!
//! These complement the WebSocket channel where request/response semantics
//! fit better: the initial state load and chat submission from clients
//! without a socket.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};

use crate::broadcast::WsMessage;
use crate::snapshot::ChatSnapshot;
use crate::state::{ChatState, lock_state, push_user_message};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub chat_state: Arc<Mutex<ChatState>>,
    pub chat_tx: mpsc::Sender<String>,
    pub broadcast_tx: broadcast::Sender<WsMessage>,
}

/// GET /api/state — Full state snapshot.
///
/// Used for initial page load (before the WebSocket connects) and as a
/// fallback for plain HTTP clients.
pub async fn get_state(State(app): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = ChatSnapshot::from_chat_state(&lock_state(&app.chat_state));
    Json(serde_json::to_value(snapshot).unwrap_or_default())
}

/// Request body for POST /api/chat.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/chat — Send a user chat message.
///
/// Echoes the message into the displayed history, broadcasts it to all
/// WebSocket clients, and forwards it to the turn loop via an mpsc channel.
/// Returns 204 on success, 503 if the turn loop is not consuming messages.
pub async fn post_chat(State(app): State<AppState>, Json(body): Json<ChatRequest>) -> StatusCode {
    push_user_message(&app.chat_state, &body.message);
    let _ = app.broadcast_tx.send(WsMessage::UserMessage {
        message: body.message.clone(),
    });
    match app.chat_tx.try_send(body.message) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
