//! Trace reconstruction and the per-process trace log.
//!
//! [`reconstruct`] walks the step record of one engine run and renders an
//! ordered, bounded, human-readable line per step. [`format_turn_entry`]
//! folds those lines into a single per-turn entry under a latency summary
//! line, and [`TraceLog`] retains entries in a bounded ring so the log
//! cannot grow without limit in a long-running process.

use crate::run::{EngineOutput, RunItem, render_value};
use std::collections::VecDeque;

/// Detailed step lines retained per turn (oldest dropped first).
pub const MAX_TRACE_STEPS: usize = 8;
/// Message text preview length in a trace line.
const MESSAGE_PREVIEW_CHARS: usize = 80;
/// Tool output preview length in a trace line.
const OUTPUT_PREVIEW_CHARS: usize = 60;
/// Default turn entries retained by [`TraceLog`].
pub const DEFAULT_TRACE_ENTRIES: usize = 256;

/// First `max` characters of `text`.
fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Render one step item as a trace line.
fn render_item(item: &RunItem) -> String {
    match item {
        RunItem::Message { text, .. } => {
            format!("[Message] {}", preview(text, MESSAGE_PREVIEW_CHARS))
        }
        RunItem::ToolCall { name, args, output } => {
            let out = output.as_ref().map(render_value).unwrap_or_default();
            format!(
                "[Tool] {name}({args}) → {}",
                preview(&out, OUTPUT_PREVIEW_CHARS)
            )
        }
        RunItem::Handoff { target } => {
            let name = target.as_ref().map_or("unknown", |t| t.name.as_str());
            format!("[Handoff] {name}")
        }
        RunItem::Other { raw } => raw.clone(),
    }
}

/// Linearize the step record of one engine run into human-readable lines.
///
/// Only the last [`MAX_TRACE_STEPS`] rendered lines are retained, in
/// original order. An output with no step items — including any
/// unrecognized (raw) output shape — produces an empty sequence, and the
/// caller omits the detail block entirely.
pub fn reconstruct(output: &EngineOutput) -> Vec<String> {
    let Some(result) = output.as_run() else {
        return Vec::new();
    };
    let skip = result.items.len().saturating_sub(MAX_TRACE_STEPS);
    result.items[skip..].iter().map(render_item).collect()
}

/// Compose the per-turn trace entry: the latency summary line plus one
/// `"\n  → "`-prefixed continuation line per reconstructed step.
pub fn format_turn_entry(message: &str, duration_secs: f64, steps: &[String]) -> String {
    let mut entry = format!("User: {message} → Agent replied in {duration_secs:.2}s");
    if !steps.is_empty() {
        entry.push_str("\n  → ");
        entry.push_str(&steps.join("\n  → "));
    }
    entry
}

// ── Trace log ──────────────────────────────────────────────────────

/// Bounded ring of per-turn trace entries.
///
/// Append-only from the caller's point of view; once the capacity is
/// reached, the oldest entry is dropped for each new one.
#[derive(Debug)]
pub struct TraceLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TRACE_ENTRIES)
    }

    /// A log retaining at most `capacity` turn entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a turn entry, dropping the oldest if the ring is full.
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    /// All retained entries joined by newlines, oldest first.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}
