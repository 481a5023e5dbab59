//! Log capture for front-end log panes.
//!
//! A `tracing` subscriber layer that writes every log event into a shared
//! [`LogBuffer`]. The front end drains the buffer at its own pace and
//! renders the lines alongside the chat; the buffer has its own mutex, so
//! logging never contends with the presentation layer's state lock.
//!
//! Events emitted inside a span (engine calls run under an `engine_call`
//! span) are prefixed with the span name, so the log pane groups a turn's
//! lines visually without any extra plumbing.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::registry::LookupSpan;

/// Maximum pending lines held in the buffer between drains.
pub const MAX_BUFFERED_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
const BUFFER_TRIM_TO: usize = 1200;

/// Log severity (mirrors tracing levels).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// A single captured log line.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LogLine {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// Shared buffer of pending log lines.
#[derive(Clone)]
pub struct LogBuffer(Arc<Mutex<Vec<LogLine>>>);

impl LogBuffer {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::with_capacity(128))))
    }

    /// Drain all pending lines, returning them in capture order.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buf)
    }

    fn push(&self, line: LogLine) {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        buf.push(line);
        // Cap the buffer so a burst of logs before the next drain doesn't
        // consume unbounded memory.
        if buf.len() > MAX_BUFFERED_LINES {
            let excess = buf.len() - BUFFER_TRIM_TO;
            buf.drain(..excess);
        }
    }
}

/// A [`tracing_subscriber::Layer`] that captures events into a [`LogBuffer`].
pub struct LogCaptureLayer {
    buffer: LogBuffer,
}

impl LogCaptureLayer {
    /// Create the layer and its associated buffer. Hand the buffer to the
    /// front end; compose the layer into the subscriber registry.
    pub fn new() -> (Self, LogBuffer) {
        let buffer = LogBuffer::new();
        (
            Self {
                buffer: buffer.clone(),
            },
            buffer,
        )
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for LogCaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let mut message = visitor.finish();

        // Name the enclosing span so a turn's lines read as
        // "engine_call: ..." in the log pane.
        if let Some(span) = ctx.event_span(event) {
            message = format!("{}: {message}", span.name());
        }

        self.buffer.push(LogLine {
            time: Local::now().format("%H:%M:%S").to_string(),
            level: LogLevel::from(*event.metadata().level()),
            message,
        });
    }
}

/// Visitor folding an event's fields into one display line:
/// the message first, then any structured fields as `key=value` pairs.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push(&mut self, name: &str, value: &str) {
        if name == "message" {
            self.message = value.to_string();
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            self.fields.push_str(name);
            self.fields.push('=');
            self.fields.push_str(value);
        }
    }

    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }
}

impl tracing::field::Visit for LineVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        // Debug-formatted strings arrive quoted; strip the quotes for display.
        let clean = rendered
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&rendered);
        self.push(field.name(), clean);
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field.name(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn drain_empties_the_buffer() {
        let buffer = LogBuffer::new();
        buffer.push(LogLine {
            time: "00:00:00".into(),
            level: LogLevel::Info,
            message: "hello".into(),
        });

        let lines = buffer.drain();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "hello");
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn log_line_serializes() {
        let line = LogLine {
            time: "12:34:56".into(),
            level: LogLevel::Warn,
            message: "careful".into(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["level"], "Warn");
        assert_eq!(json["message"], "careful");
    }

    #[test]
    fn captured_line_is_prefixed_with_enclosing_span() {
        let (layer, buffer) = LogCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("engine_call");
            let _guard = span.enter();
            tracing::info!("request sent");
        });

        let lines = buffer.drain();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "engine_call: request sent");
        assert_eq!(lines[0].level, LogLevel::Info);
    }

    #[test]
    fn structured_fields_fold_into_the_line() {
        let (layer, buffer) = LogCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(session = "user_123", chars = 5, "engine request");
        });

        let lines = buffer.drain();
        assert_eq!(lines[0].message, "engine request session=user_123 chars=5");
        assert_eq!(lines[0].level, LogLevel::Debug);
    }

    #[test]
    fn line_without_a_span_is_unprefixed() {
        let (layer, buffer) = LogCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("standalone");
        });

        assert_eq!(buffer.drain()[0].message, "standalone");
    }
}
