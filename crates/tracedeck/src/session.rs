//! Opaque handle to the engine-side session store.
//!
//! Conversation persistence lives with the agent engine, keyed by a stable
//! session identifier. This core never inspects the stored state — it only
//! passes the handle through on every [`run`](crate::run::AgentEngine::run)
//! call so the engine can preserve multi-turn context.

use serde::{Deserialize, Serialize};

/// Stable identifier for one persisted conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: String,
}

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
