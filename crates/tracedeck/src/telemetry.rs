//! Process-startup instrumentation.
//!
//! Composes the global `tracing` subscriber: a stderr fmt layer plus the
//! [`LogCaptureLayer`](crate::logs::LogCaptureLayer) feeding the front end's
//! log pane. Every engine call opens an `engine_call` span (see
//! [`RemoteEngine`](crate::engine::RemoteEngine)), so any layer composed
//! here observes one span per turn; the project name and collector endpoint
//! are recorded at startup for the operator wiring such a layer.
//!
//! Attach failures (most commonly double registration in tests) are logged
//! as warnings and never block startup — the process simply runs with
//! degraded tracing.

use crate::logs::{LogBuffer, LogCaptureLayer};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Telemetry boundary configuration, supplied at process startup.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Project name reported to the telemetry backend.
    pub project: String,
    /// Collector endpoint, recorded at startup.
    pub endpoint: Option<String>,
    /// Disable instrumentation entirely when `false`.
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            project: "tracedeck".into(),
            endpoint: None,
            enabled: true,
        }
    }
}

/// Install the global subscriber and return the log buffer for the UI.
///
/// Always returns a usable buffer: when instrumentation is disabled or
/// attachment fails, the buffer simply stays empty.
pub fn init(config: &TelemetryConfig) -> LogBuffer {
    let (capture, buffer) = LogCaptureLayer::new();

    if !config.enabled {
        return buffer;
    }

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(capture);

    if let Err(e) = registry.try_init() {
        // An earlier subscriber is already installed; route the warning
        // through it.
        warn!("instrumentation already attached: {e}");
        return buffer;
    }

    info!(
        "Telemetry attached: project={}, endpoint={}",
        config.project,
        config.endpoint.as_deref().unwrap_or("(none)")
    );
    buffer
}
