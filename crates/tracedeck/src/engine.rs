//! HTTP client for a remote agent-runner endpoint.
//!
//! The engine is an external collaborator; this client is only the plumbing
//! to reach it. One POST per turn carrying `{message, session_id}`, one JSON
//! body back, interpreted by [`EngineOutput::from_value`]. A structured
//! `artifact: {path}` field in the response is recorded on the
//! [`ArtifactTracker`] before the output is returned — the turn-local
//! artifact channel the classifier's before/after check consumes.

use crate::artifact::ArtifactTracker;
use crate::run::{AgentEngine, EngineFuture, EngineOutput};
use crate::session::SessionHandle;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{Instrument, debug, info_span};

/// Async HTTP client implementing [`AgentEngine`] against an agent-runner
/// service.
pub struct RemoteEngine {
    client: reqwest::Client,
    endpoint: String,
    tracker: ArtifactTracker,
}

impl RemoteEngine {
    /// Create a client for the given run endpoint.
    ///
    /// No request timeout is set here: a turn legitimately takes as long as
    /// the agent's reasoning does. Cancellation belongs to the caller — see
    /// [`TurnOrchestrator::with_turn_timeout`](crate::turn::TurnOrchestrator::with_turn_timeout).
    pub fn new(endpoint: impl Into<String>, tracker: ArtifactTracker) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("tracedeck/0.2")
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            tracker,
        })
    }

    async fn run_turn(&self, message: &str, session: &SessionHandle) -> Result<EngineOutput, String> {
        debug!(
            "Engine request: endpoint={}, session={}, message={} chars",
            self.endpoint,
            session,
            message.len()
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&json!({"message": message, "session_id": session.id}))
            .send()
            .await
            .map_err(|e| format!("engine request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read engine response: {e}"))?;

        debug!(
            "Engine response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("engine HTTP {status}: {text}"));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse engine response: {e}"))?;

        // Tool side of the response: a produced file, reported out-of-band
        // from the run result itself.
        if let Some(path) = value
            .get("artifact")
            .and_then(|a| a.get("path"))
            .and_then(Value::as_str)
        {
            let sequence = self.tracker.record(path);
            debug!("Engine reported artifact {path} (sequence {sequence})");
        }

        Ok(EngineOutput::from_value(value))
    }
}

impl AgentEngine for RemoteEngine {
    fn run<'a>(&'a self, message: &'a str, session: &'a SessionHandle) -> EngineFuture<'a> {
        // One span per engine call; an attached subscriber sees the whole
        // turn request under it.
        let span = info_span!("engine_call", session = %session.id);
        Box::pin(self.run_turn(message, session).instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    #[test]
    fn builds_against_any_endpoint() {
        let engine = RemoteEngine::new("http://127.0.0.1:8090/run", ArtifactTracker::new());
        assert!(engine.is_ok());
    }

    struct SpanRecorder(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for SpanRecorder {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: Context<'_, S>,
        ) {
            self.0
                .lock()
                .unwrap()
                .push(attrs.metadata().name().to_string());
        }
    }

    #[test]
    fn every_engine_call_opens_a_span() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(SpanRecorder(names.clone()));

        let engine = RemoteEngine::new("http://127.0.0.1:9/run", ArtifactTracker::new()).unwrap();
        let session = SessionHandle::new("user_123");
        tracing::subscriber::with_default(subscriber, || {
            // Span creation happens at call time, before the future runs.
            let _pending = engine.run("hi", &session);
        });

        assert_eq!(names.lock().unwrap().as_slice(), ["engine_call"]);
    }
}
