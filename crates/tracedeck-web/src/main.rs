//! Interactive web chat front end — end-to-end tracedeck binary.
//!
//! Runs a server that accepts user messages from the browser via WebSocket
//! or REST, forwards each one to a remote agent engine, and streams the
//! classified reply plus a reconstructed trace entry back in real time.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tracedeck-web -- --engine-url http://127.0.0.1:8090/run
//! cargo run -p tracedeck-web -- --engine-url http://... --port 8080
//! cargo run -p tracedeck-web -- --engine-url http://... --turn-timeout-secs 120
//! ```
//!
//! Then open the printed URL in a browser (or use curl / wscat) to chat.
//!
//! ## Sending messages
//!
//! **WebSocket** (connect to `/ws`):
//! ```json
//! {"type": "chat", "message": "plot the sales data"}
//! ```
//!
//! **REST** (`POST /api/chat`):
//! ```json
//! {"message": "plot the sales data"}
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracedeck::artifact::ArtifactTracker;
use tracedeck::engine::RemoteEngine;
use tracedeck::logs::LogBuffer;
use tracedeck::session::SessionHandle;
use tracedeck::telemetry::{self, TelemetryConfig};
use tracedeck::turn::TurnOrchestrator;
use tracedeck::{ChatContent, ChatMessage};
use tracedeck_web::state::{self, ChatState};
use tracedeck_web::{WebConfig, WsMessage, spawn_web};

/// Interactive web chat front end for a remote agent engine.
#[derive(Parser)]
#[command(about = "Web chat front end with per-turn trace reconstruction")]
struct Args {
    /// Agent engine run endpoint (POST, one call per turn).
    #[arg(long)]
    engine_url: String,

    /// Port for the web server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Session identifier sent with every engine call.
    #[arg(long, default_value = "user_123")]
    session: String,

    /// Abort a turn if the engine takes longer than this many seconds.
    #[arg(long)]
    turn_timeout_secs: Option<u64>,

    /// Serve a static frontend export from this directory.
    #[arg(long)]
    static_dir: Option<std::path::PathBuf>,

    /// Project name reported to the telemetry backend.
    #[arg(long, default_value = "tracedeck")]
    telemetry_project: String,

    /// Telemetry collector endpoint, recorded at startup.
    #[arg(long)]
    telemetry_endpoint: Option<String>,

    /// Disable instrumentation entirely.
    #[arg(long)]
    no_telemetry: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    // 1. Instrumentation first, so startup itself is logged.
    let log_buffer = telemetry::init(&TelemetryConfig {
        project: args.telemetry_project.clone(),
        endpoint: args.telemetry_endpoint.clone(),
        enabled: !args.no_telemetry,
    });

    // 2. Engine client and turn orchestrator. The tracker handle is shared
    //    with the engine so reported artifacts land where the classifier
    //    looks for them.
    let tracker = ArtifactTracker::new();
    let engine = RemoteEngine::new(&args.engine_url, tracker.clone())?;
    let mut orchestrator =
        TurnOrchestrator::new(engine, tracker, SessionHandle::new(&args.session));
    if let Some(secs) = args.turn_timeout_secs {
        orchestrator = orchestrator.with_turn_timeout(Duration::from_secs(secs));
    }

    // 3. Shared chat state and WebSocket broadcast channel.
    let chat_state = Arc::new(Mutex::new(ChatState::default()));
    let (ws_tx, _) = tokio::sync::broadcast::channel::<WsMessage>(256);

    // 4. Spawn the web server — returns a receiver for chat messages from the browser.
    let web_config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
        static_dir: args.static_dir.clone(),
        ..Default::default()
    };
    let (addr, mut chat_rx) = spawn_web(chat_state.clone(), ws_tx.clone(), web_config).await?;
    println!("Chat UI: http://{addr}");
    println!("Waiting for messages from the browser...\n");

    // 5. Drain captured log lines into the state and out to clients.
    spawn_log_pump(log_buffer, chat_state.clone(), ws_tx.clone());

    // 6. Turn loop — the single consumer of the chat channel. Serializing
    //    turns here is what makes artifact attribution unambiguous.
    let mut history: Vec<ChatMessage> = Vec::new();

    while let Some(user_message) = chat_rx.recv().await {
        println!("> {user_message}");

        state::set_busy(&chat_state, true);
        let _ = ws_tx.send(WsMessage::Busy { busy: true });

        match orchestrator.process_turn(&user_message, &history).await {
            Ok(outcome) => {
                // The outcome's history is authoritative; replace the
                // echoed copy wholesale.
                history = outcome.history.clone();
                state::set_history(&chat_state, outcome.history);
                state::set_trace(&chat_state, &outcome.trace_text);

                let _ = ws_tx.send(match outcome.reply.content {
                    ChatContent::File(file) => WsMessage::AssistantFile { file },
                    ChatContent::Text(text) => WsMessage::AssistantText { text },
                });
                let _ = ws_tx.send(WsMessage::TraceEntry {
                    entry: outcome.trace_entry.clone(),
                });

                println!("{}\n", outcome.trace_entry);
            }
            Err(e) => {
                // Keep the failure visible in the conversation itself, not
                // just the logs.
                let error_reply = ChatMessage::assistant_text(format!("Error: {e}"));
                history.push(ChatMessage::user(&user_message));
                history.push(error_reply);
                state::set_history(&chat_state, history.clone());
                let _ = ws_tx.send(WsMessage::TurnFailed { error: e.clone() });

                eprintln!("turn failed: {e}\n");
            }
        }

        state::set_busy(&chat_state, false);
        let _ = ws_tx.send(WsMessage::Busy { busy: false });
    }

    Ok(())
}

/// Periodically drain the tracing capture buffer into the shared state and
/// broadcast each line to connected clients.
fn spawn_log_pump(
    buffer: LogBuffer,
    chat_state: Arc<Mutex<ChatState>>,
    ws_tx: tokio::sync::broadcast::Sender<WsMessage>,
) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_millis(250));
        loop {
            tick.tick().await;
            let lines = buffer.drain();
            if lines.is_empty() {
                continue;
            }
            for line in &lines {
                let _ = ws_tx.send(WsMessage::Log { line: line.clone() });
            }
            state::push_logs(&chat_state, lines);
        }
    });
}
