//! Integration tests for the tracedeck-web server.
//!
//! These tests start a real axum server on a random port and exercise
//! the REST endpoints.

use std::sync::{Arc, Mutex};

use tracedeck::ChatMessage;
use tracedeck_web::state::{ChatState, push_assistant_message, set_busy, set_trace};
use tracedeck_web::{WebConfig, WsMessage, spawn_web};

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server() -> (
    Arc<Mutex<ChatState>>,
    String,
    tokio::sync::mpsc::Receiver<String>,
) {
    let state = Arc::new(Mutex::new(ChatState::default()));
    let (tx, _) = tokio::sync::broadcast::channel::<WsMessage>(64);

    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        ..Default::default()
    };

    let (addr, chat_rx) = spawn_web(state.clone(), tx, config).await.unwrap();
    let base = format!("http://{addr}");
    (state, base, chat_rx)
}

// ── REST Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn get_state_returns_snapshot() {
    let (state, base, _chat_rx) = spawn_test_server().await;

    // Mutate the state so the snapshot has non-default values.
    push_assistant_message(&state, ChatMessage::assistant_text("Hello from test"));
    set_trace(&state, "User: hi → Agent replied in 0.10s");
    set_busy(&state, true);

    let resp = reqwest::get(format!("{base}/api/state")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["history"].as_array().unwrap().len(), 1);
    assert_eq!(json["history"][0]["content"], "Hello from test");
    assert!(json["trace"].as_str().unwrap().starts_with("User: hi"));
    assert!(json["busy"].as_bool().unwrap());
    assert!(json["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn post_chat_delivers_message() {
    let (_state, base, mut chat_rx) = spawn_test_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&serde_json::json!({"message": "plot the sales data"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    // Verify the message was delivered to the receiver.
    let msg = chat_rx.try_recv().unwrap();
    assert_eq!(msg, "plot the sales data");
}

#[tokio::test]
async fn post_chat_echoes_into_history() {
    let (state, base, _chat_rx) = spawn_test_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let s = state.lock().unwrap();
    assert_eq!(s.history.len(), 1);
    assert_eq!(s.history[0], ChatMessage::user("hello"));
}

#[tokio::test]
async fn post_chat_when_turn_loop_gone_is_unavailable() {
    let (_state, base, chat_rx) = spawn_test_server().await;
    // Dropping the receiver closes the channel; sends must fail.
    drop(chat_rx);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/chat"))
        .json(&serde_json::json!({"message": "anyone home?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn unknown_route_is_404_without_static_dir() {
    let (_state, base, _chat_rx) = spawn_test_server().await;

    let resp = reqwest::get(format!("{base}/nope")).await.unwrap();
    assert_eq!(resp.status(), 404);
}
