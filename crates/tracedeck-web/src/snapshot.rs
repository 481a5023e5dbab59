//! Serializable projection of [`ChatState`] for WebSocket and REST transport.
//!
//! Sent whole on initial page load and whenever a WebSocket client falls
//! behind the broadcast channel. Logs are capped to the most recent entries
//! to bound payload size.

use crate::state::ChatState;
use serde::Serialize;
use tracedeck::ChatMessage;
use tracedeck::logs::LogLine;

/// Maximum number of log lines included in a snapshot.
const SNAPSHOT_MAX_LOGS: usize = 200;

/// Wire view of the chat state.
#[derive(Debug, Serialize)]
pub struct ChatSnapshot {
    pub history: Vec<ChatMessage>,
    pub trace: String,
    pub busy: bool,
    pub logs: Vec<LogLine>,
}

impl ChatSnapshot {
    /// Build a snapshot from the current state. Call while holding the
    /// state lock.
    pub fn from_chat_state(state: &ChatState) -> Self {
        let log_start = state.logs.len().saturating_sub(SNAPSHOT_MAX_LOGS);
        Self {
            history: state.history.clone(),
            trace: state.trace.clone(),
            busy: state.busy,
            logs: state.logs[log_start..].to_vec(),
        }
    }
}
