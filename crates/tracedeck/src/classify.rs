//! Response classification: what one turn should surface to the user.
//!
//! Pure inspection of the engine output plus the artifact tracker's
//! before/after sequence numbers. Never fails — unrecognized shapes degrade
//! to their textual rendering.

use crate::FileReference;
use crate::artifact::ArtifactTracker;
use crate::run::{EngineOutput, render_value};

/// What the presentation layer should display for one turn.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayPayload {
    /// A tool produced a new file artifact during this turn.
    File(FileReference),
    /// The engine returned a bare mapping carrying a path-like key; passed
    /// through verbatim.
    Raw(serde_json::Value),
    /// Plain text.
    Text(String),
}

/// Decide the display payload for one turn. First match wins:
///
/// 1. The tracker's sequence number moved past `sequence_before` and a file
///    is recorded — the artifact takes precedence over whatever the run
///    result says, because tool outputs are not guaranteed to surface
///    through it.
/// 2. The raw output is a mapping with a `path` key — passed through as-is.
/// 3. A recognized run result — its final output text.
/// 4. Anything else — the textual rendering of the whole value. Defensive
///    fallback, not expected in normal operation.
pub fn classify(
    output: &EngineOutput,
    tracker: &ArtifactTracker,
    sequence_before: u64,
) -> DisplayPayload {
    if tracker.sequence() != sequence_before
        && let Some(file) = tracker.last_file()
    {
        return DisplayPayload::File(file);
    }

    match output {
        EngineOutput::Raw(value) if value.get("path").is_some() => {
            DisplayPayload::Raw(value.clone())
        }
        EngineOutput::Run(result) => DisplayPayload::Text(result.final_output.clone()),
        EngineOutput::Raw(value) => DisplayPayload::Text(render_value(value)),
    }
}
