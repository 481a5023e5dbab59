//! Shared record of the most recently produced file artifact.
//!
//! Tools that generate files (plots, exports) have no return channel to the
//! orchestrator — their output is not guaranteed to surface through the run
//! result. Instead, whoever executes the tool calls
//! [`ArtifactTracker::record`], and the orchestrator compares the sequence
//! number before and after the engine call to detect "a new artifact was
//! produced this turn".
//!
//! The tracker is a cloneable handle passed explicitly to every party that
//! needs it — there is no process-wide singleton. Turns must be serialized
//! by the caller (the web binary's single chat-channel consumer does this)
//! for the before/after comparison to attribute artifacts correctly.

use crate::FileReference;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ArtifactState {
    sequence: u64,
    last_file: Option<FileReference>,
}

/// Cloneable handle to the shared artifact record.
#[derive(Clone, Debug, Default)]
pub struct ArtifactTracker {
    inner: Arc<Mutex<ArtifactState>>,
}

impl ArtifactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly produced file: advances the sequence number and
    /// replaces the last-file slot. Returns the new sequence number.
    pub fn record(&self, path: impl Into<String>) -> u64 {
        let mut state = self.lock();
        state.sequence += 1;
        state.last_file = Some(FileReference::new(path));
        state.sequence
    }

    /// Current sequence number. Starts at 0; each recorded artifact
    /// increments it by one.
    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }

    /// The most recently recorded file, if any artifact has ever been
    /// produced.
    pub fn last_file(&self) -> Option<FileReference> {
        self.lock().last_file.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ArtifactState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
