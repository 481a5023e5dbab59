//! Server-to-client WebSocket messages.
//!
//! The turn loop publishes incremental updates over a `tokio::sync::broadcast`
//! channel; every connected WebSocket client receives them. Clients that fall
//! behind are resynchronized with a fresh [`ChatSnapshot`](crate::snapshot::ChatSnapshot).

use serde::Serialize;
use tracedeck::FileReference;
use tracedeck::logs::LogLine;

/// A message sent from the server to WebSocket clients.
///
/// Discriminated on the `type` field when serialized to JSON.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full state snapshot (sent on initial connect and after reconnect).
    Snapshot { data: serde_json::Value },
    /// A user message entered the turn queue.
    UserMessage { message: String },
    /// The assistant replied with plain text.
    AssistantText { text: String },
    /// The assistant replied with a generated file artifact.
    AssistantFile { file: FileReference },
    /// One formatted trace entry for the turn that just completed.
    TraceEntry { entry: String },
    /// The turn failed; the error is also appended to the chat history.
    TurnFailed { error: String },
    /// Whether a turn is currently in flight.
    Busy { busy: bool },
    /// A log line captured from tracing.
    Log { line: LogLine },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_type_tag() {
        let msg = WsMessage::UserMessage {
            message: "plot sales".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "user_message");
        assert_eq!(json["message"], "plot sales");
    }

    #[test]
    fn assistant_file_carries_the_path() {
        let msg = WsMessage::AssistantFile {
            file: FileReference::new("sales.png"),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "assistant_file");
        assert_eq!(json["file"]["path"], "sales.png");
    }

    #[test]
    fn trace_entry_serializes_verbatim() {
        let msg = WsMessage::TraceEntry {
            entry: "User: hi → Agent replied in 0.10s".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "trace_entry");
        assert!(json["entry"].as_str().unwrap().contains("0.10s"));
    }

    #[test]
    fn turn_failed_serializes_error() {
        let msg = WsMessage::TurnFailed {
            error: "engine HTTP 502".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "turn_failed");
        assert_eq!(json["error"], "engine HTTP 502");
    }
}
