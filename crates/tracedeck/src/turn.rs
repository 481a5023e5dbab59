//! The turn orchestrator: one call per user message.
//!
//! Composes the engine call, response classification, and trace
//! reconstruction into a single [`process_turn`](TurnOrchestrator::process_turn)
//! operation. The orchestrator owns the per-process [`TraceLog`] and the
//! session handle; history stays with the presentation layer and is passed
//! in and returned on every call.

use crate::artifact::ArtifactTracker;
use crate::classify::{DisplayPayload, classify};
use crate::run::{AgentEngine, render_value};
use crate::session::SessionHandle;
use crate::trace::{TraceLog, format_turn_entry, reconstruct};
use crate::{ChatMessage, FileReference};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Everything one completed turn produced.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// The input history with the user message and assistant reply appended.
    pub history: Vec<ChatMessage>,
    /// The assistant reply alone (last entry of `history`).
    pub reply: ChatMessage,
    /// The trace entry recorded for this turn.
    pub trace_entry: String,
    /// The full retained trace log, newline-joined.
    pub trace_text: String,
    /// Wall-clock duration of the engine call.
    pub duration: Duration,
}

/// Processes turns against one agent engine.
///
/// Not synchronized internally: callers process one turn at a time (the web
/// binary's chat loop is the single consumer), which also keeps the artifact
/// before/after comparison race-free.
pub struct TurnOrchestrator<E: AgentEngine> {
    engine: E,
    tracker: ArtifactTracker,
    session: SessionHandle,
    trace_log: TraceLog,
    turn_timeout: Option<Duration>,
}

impl<E: AgentEngine> TurnOrchestrator<E> {
    pub fn new(engine: E, tracker: ArtifactTracker, session: SessionHandle) -> Self {
        Self {
            engine,
            tracker,
            session,
            trace_log: TraceLog::new(),
            turn_timeout: None,
        }
    }

    /// Abort engine calls that exceed `timeout`. Without this, a hung engine
    /// hangs the turn indefinitely.
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = Some(timeout);
        self
    }

    /// The session handle turns run under.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Process one user message.
    ///
    /// Invokes the engine exactly once, classifies the result against the
    /// artifact tracker's before/after sequence numbers, appends the user
    /// message and assistant reply to a copy of `history`, and commits one
    /// formatted entry to the trace log.
    ///
    /// Engine failures (and timeouts) propagate unchanged, and a failed turn
    /// commits nothing: either a full trace entry is appended or none is.
    pub async fn process_turn(
        &mut self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<TurnOutcome, String> {
        let sequence_before = self.tracker.sequence();

        let start = Instant::now();
        let run = self.engine.run(message, &self.session);
        let result = match self.turn_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, run).await {
                Ok(result) => result,
                Err(_) => Err(format!(
                    "agent engine call exceeded {:.0}s turn timeout",
                    timeout.as_secs_f64()
                )),
            },
            None => run.await,
        };
        let duration = start.elapsed();

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    "Turn failed after {:.2}s (session {}): {e}",
                    duration.as_secs_f64(),
                    self.session
                );
                return Err(e);
            }
        };

        let payload = classify(&output, &self.tracker, sequence_before);
        let reply = ChatMessage {
            role: crate::ChatRole::Assistant,
            content: payload_content(payload),
        };

        let mut new_history = history.to_vec();
        new_history.push(ChatMessage::user(message));
        new_history.push(reply.clone());

        let steps = reconstruct(&output);
        debug!(
            "Turn complete in {:.2}s: {} trace step(s)",
            duration.as_secs_f64(),
            steps.len()
        );

        let trace_entry = format_turn_entry(message, duration.as_secs_f64(), &steps);
        self.trace_log.push(trace_entry.clone());

        Ok(TurnOutcome {
            history: new_history,
            reply,
            trace_entry,
            trace_text: self.trace_log.render(),
            duration,
        })
    }
}

/// Convert a display payload into history-entry content.
///
/// History entries are text or file references; a verbatim raw mapping is
/// narrowed to its file reference when `path` is a string, and degrades to
/// its text rendering otherwise.
fn payload_content(payload: DisplayPayload) -> crate::ChatContent {
    match payload {
        DisplayPayload::File(file) => crate::ChatContent::File(file),
        DisplayPayload::Raw(value) => match value.get("path").and_then(Value::as_str) {
            Some(path) => crate::ChatContent::File(FileReference::new(path)),
            None => crate::ChatContent::Text(render_value(&value)),
        },
        DisplayPayload::Text(text) => crate::ChatContent::Text(text),
    }
}
