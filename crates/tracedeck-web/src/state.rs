//! Shared chat state between the turn loop and the web front end.
//!
//! ```text
//! Turn loop ──writes──▶ Arc<Mutex<ChatState>> ◀──reads── REST/WS handlers
//! ```
//!
//! The turn loop writes the authoritative history and trace text after each
//! turn; handlers read snapshots for page loads and reconnects. No rendering
//! types here — plain data only.

use std::sync::{Arc, Mutex};
use tracedeck::logs::LogLine;
use tracedeck::{ChatMessage, ChatRole};

/// Maximum log lines kept in memory.
pub const MAX_LOG_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
pub const LOG_TRIM_TO: usize = 1200;

/// Presentation-layer state shared behind a mutex.
#[derive(Debug, Default)]
pub struct ChatState {
    /// The conversation history, `{role, content}` entries in order.
    pub history: Vec<ChatMessage>,
    /// The newline-joined trace log rendered in the trace console.
    pub trace: String,
    /// A turn is currently in flight.
    pub busy: bool,
    /// Captured log lines for the log pane.
    pub logs: Vec<LogLine>,
}

/// Lock the shared state, recovering from a poisoned lock. The state is
/// plain data, so a panic mid-update leaves nothing structurally broken.
pub fn lock_state(state: &Arc<Mutex<ChatState>>) -> std::sync::MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Lock the shared state and run a closure on the guard.
macro_rules! with_state {
    ($state:expr, |$s:ident| $body:block) => {{
        let mut $s = lock_state($state);
        $body
    }};
}

/// Append a user message to the displayed history (immediate echo; the turn
/// loop later replaces history wholesale with the orchestrator's copy).
pub fn push_user_message(state: &Arc<Mutex<ChatState>>, message: &str) {
    with_state!(state, |s| {
        s.history.push(ChatMessage::user(message));
    });
}

/// Append an assistant entry to the displayed history.
pub fn push_assistant_message(state: &Arc<Mutex<ChatState>>, message: ChatMessage) {
    debug_assert_eq!(message.role, ChatRole::Assistant);
    with_state!(state, |s| {
        s.history.push(message);
    });
}

/// Replace the displayed history with the post-turn authoritative copy.
pub fn set_history(state: &Arc<Mutex<ChatState>>, history: Vec<ChatMessage>) {
    with_state!(state, |s| {
        s.history = history;
    });
}

/// Replace the rendered trace text.
pub fn set_trace(state: &Arc<Mutex<ChatState>>, trace: &str) {
    with_state!(state, |s| {
        s.trace = trace.to_string();
    });
}

/// Mark whether a turn is in flight.
pub fn set_busy(state: &Arc<Mutex<ChatState>>, busy: bool) {
    with_state!(state, |s| {
        s.busy = busy;
    });
}

/// Merge drained log lines into the state, respecting the trim limits.
pub fn push_logs(state: &Arc<Mutex<ChatState>>, lines: Vec<LogLine>) {
    if lines.is_empty() {
        return;
    }
    with_state!(state, |s| {
        s.logs.extend(lines);
        if s.logs.len() > MAX_LOG_LINES {
            let trim_to = s.logs.len() - LOG_TRIM_TO;
            s.logs.drain(..trim_to);
        }
    });
}
