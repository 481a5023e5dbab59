//! Turn orchestration and trace reconstruction for chat agents.
//!
//! `tracedeck` is the core of a minimal chat front end for a single
//! conversational agent. It does not reason and it does not run tools — the
//! agent engine is an external collaborator behind the
//! [`AgentEngine`](run::AgentEngine) trait. What this crate does own is the
//! turn pipeline: given the opaque [`EngineOutput`](run::EngineOutput) of one
//! engine invocation, decide what the user should see (a generated file, a
//! raw payload, or plain text) and linearize the engine's internal step
//! record into a human-readable trace entry.
//!
//! # The turn pipeline
//!
//! ```text
//! user message ─▶ TurnOrchestrator ─▶ AgentEngine (suspends) ─▶ EngineOutput
//!                       │                                            │
//!                       │◀── ArtifactTracker snapshot ──┐            │
//!                       ▼                               │            ▼
//!                 classify() ◀──────────────────────────┴──── reconstruct()
//!                       │                                            │
//!                       ▼                                            ▼
//!              assistant ChatMessage                       per-turn TraceLog entry
//! ```
//!
//! # Where to find things
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`run`] | [`RunResult`](run::RunResult), [`RunItem`](run::RunItem) step records, the [`AgentEngine`](run::AgentEngine) boundary |
//! | [`artifact`] | [`ArtifactTracker`](artifact::ArtifactTracker) — sequence counter + last-file slot for tool-produced files |
//! | [`classify`] | [`classify()`](classify::classify) — file / raw / text response classification |
//! | [`trace`] | [`reconstruct()`](trace::reconstruct), turn-entry formatting, the bounded [`TraceLog`](trace::TraceLog) |
//! | [`turn`] | [`TurnOrchestrator`](turn::TurnOrchestrator) — one call per user message |
//! | [`engine`] | [`RemoteEngine`](engine::RemoteEngine) — HTTP client for an agent-runner endpoint |
//! | [`session`] | Opaque [`SessionHandle`](session::SessionHandle) passed through to the engine |
//! | [`telemetry`] | Instrumentation startup; [`logs`] capture layer for UI log panes |
//!
//! # Getting started
//!
//! ```ignore
//! use tracedeck::artifact::ArtifactTracker;
//! use tracedeck::engine::RemoteEngine;
//! use tracedeck::session::SessionHandle;
//! use tracedeck::turn::TurnOrchestrator;
//!
//! let tracker = ArtifactTracker::new();
//! let engine = RemoteEngine::new("http://127.0.0.1:8090/run", tracker.clone())?;
//! let mut orchestrator = TurnOrchestrator::new(
//!     engine,
//!     tracker,
//!     SessionHandle::new("user_123"),
//! );
//!
//! let outcome = orchestrator.process_turn("plot sales", &history).await?;
//! println!("{}", outcome.trace_text);
//! ```

pub mod artifact;
pub mod classify;
pub mod engine;
pub mod logs;
pub mod run;
pub mod session;
pub mod telemetry;
pub mod trace;
pub mod turn;

use serde::{Deserialize, Serialize};

// ── Conversation model ─────────────────────────────────────────────

/// Role of a chat history entry.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Reference to a tool-produced file, identified by path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub path: String,
}

impl FileReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Content of a chat entry: plain text, or a file reference the renderer
/// displays inline (e.g. a plot image).
///
/// Serializes untagged, so the wire shape is either a JSON string or a
/// `{"path": ...}` object — the two content shapes the presentation layer
/// recognizes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ChatContent {
    File(FileReference),
    Text(String),
}

impl ChatContent {
    /// The text form, if this is a text entry.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChatContent::Text(t) => Some(t),
            ChatContent::File(_) => None,
        }
    }

    /// The file reference, if this is a file entry.
    pub fn as_file(&self) -> Option<&FileReference> {
        match self {
            ChatContent::File(f) => Some(f),
            ChatContent::Text(_) => None,
        }
    }
}

/// One entry in the conversation history.
///
/// History is append-only across turns: [`turn::TurnOrchestrator`] never
/// mutates the sequence it is given — it returns a new one with the user
/// message and assistant reply appended.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: ChatContent,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: ChatContent::Text(content.into()),
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: ChatContent::Text(content.into()),
        }
    }

    pub fn assistant_file(file: FileReference) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: ChatContent::File(file),
        }
    }
}
