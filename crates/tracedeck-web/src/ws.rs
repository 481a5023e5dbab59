//! WebSocket endpoint.
//!
//! Each connection gets a full [`ChatSnapshot`] up front, then lives in one
//! loop that races the broadcast channel against the client's own messages.
//! A client that falls behind the broadcast capacity is handed a fresh
//! snapshot instead of the dropped updates. Inbound `{"type":"chat"}`
//! messages feed the turn loop like `POST /api/chat` does.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::broadcast::WsMessage;
use crate::snapshot::ChatSnapshot;
use crate::state::{lock_state, push_user_message};

/// GET /ws — WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

async fn handle_socket(mut socket: WebSocket, app: AppState) {
    if send_snapshot(&mut socket, &app).await.is_err() {
        return;
    }
    debug!("WebSocket client connected");

    let mut updates = app.broadcast_tx.subscribe();

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(msg) => {
                    if send_message(&mut socket, &msg).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged by {n} messages, resending snapshot");
                    if send_snapshot(&mut socket, &app).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => handle_client_message(&text, &app),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {} // Ignore binary, ping, pong.
            },
        }
    }

    debug!("WebSocket client disconnected");
}

/// Process a JSON message received from a client.
fn handle_client_message(text: &str, app: &AppState) {
    #[derive(serde::Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum ClientMessage {
        Chat { message: String },
    }

    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        debug!("Ignoring malformed WebSocket message");
        return;
    };

    match msg {
        ClientMessage::Chat { message } => {
            // Echo into the displayed history so it appears in the chat
            // stream and persists across reconnects (via snapshot).
            push_user_message(&app.chat_state, &message);
            let _ = app.broadcast_tx.send(WsMessage::UserMessage {
                message: message.clone(),
            });
            // Forward to the turn loop.
            let _ = app.chat_tx.try_send(message);
        }
    }
}

async fn send_snapshot(socket: &mut WebSocket, app: &AppState) -> Result<(), axum::Error> {
    let snapshot = ChatSnapshot::from_chat_state(&lock_state(&app.chat_state));
    send_message(
        socket,
        &WsMessage::Snapshot {
            data: serde_json::to_value(snapshot).unwrap_or_default(),
        },
    )
    .await
}

async fn send_message(socket: &mut WebSocket, msg: &WsMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).unwrap_or_default();
    socket.send(Message::Text(json.into())).await
}
