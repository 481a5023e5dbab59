//! Run results, step items, and the agent-engine boundary.
//!
//! One engine invocation produces an [`EngineOutput`]: either a recognized
//! [`RunResult`] (final text plus an ordered step record) or a raw JSON value
//! the engine returned instead. Step items are an explicit tagged union —
//! [`RunItem`] — with the discriminant fixed at construction time.
//!
//! The engine itself is opaque. Implement [`AgentEngine`] to plug one in;
//! [`RemoteEngine`](crate::engine::RemoteEngine) is the HTTP implementation
//! used by the web binary.

use crate::session::SessionHandle;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Display-name reference to the agent a handoff targets.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AgentRef {
    pub name: String,
}

impl AgentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One step recorded during an engine run.
///
/// Exactly one variant per step, chosen at construction. When items arrive
/// as untyped JSON (see [`RunItem::from_value`]), the shape is inferred by
/// attribute presence in priority order: message text, then tool-call
/// arguments, then handoff target, then raw fallback. The priority is total —
/// an item carrying both `text` and `args` is a `Message`.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunItem {
    /// A role-attributed free-text message.
    Message { role: String, text: String },
    /// A tool invocation with its argument mapping and (possibly absent)
    /// output value.
    ToolCall {
        name: String,
        args: Value,
        output: Option<Value>,
    },
    /// Transfer of turn ownership to another agent.
    Handoff { target: Option<AgentRef> },
    /// Unrecognized step shape, kept as its textual rendering.
    Other { raw: String },
}

impl RunItem {
    /// Classify an untyped JSON step record by attribute presence.
    ///
    /// Mirrors the duck-typed dispatch of the engine's own item objects:
    /// first match wins, and anything unrecognized degrades to a raw
    /// rendering rather than failing.
    pub fn from_value(value: &Value) -> RunItem {
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            let role = value
                .get("role")
                .and_then(Value::as_str)
                .unwrap_or("assistant");
            return RunItem::Message {
                role: role.to_string(),
                text: text.to_string(),
            };
        }
        if let Some(args) = value.get("args") {
            let name = value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("unknown_tool");
            return RunItem::ToolCall {
                name: name.to_string(),
                args: args.clone(),
                output: value.get("output").cloned(),
            };
        }
        if let Some(agent) = value.get("agent") {
            let target = agent
                .get("name")
                .and_then(Value::as_str)
                .map(AgentRef::new);
            return RunItem::Handoff { target };
        }
        RunItem::Other {
            raw: render_value(value),
        }
    }
}

/// The structured outcome of one engine invocation: a final textual output
/// and the ordered sequence of steps taken to produce it.
///
/// Immutable once returned by the engine.
#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct RunResult {
    pub final_output: String,
    pub items: Vec<RunItem>,
}

impl RunResult {
    pub fn new(final_output: impl Into<String>, items: Vec<RunItem>) -> Self {
        Self {
            final_output: final_output.into(),
            items,
        }
    }
}

/// What one engine call actually returned.
///
/// Engines normally hand back a [`RunResult`], but the boundary is opaque:
/// a tool may surface a bare payload instead. Downstream code treats `Raw`
/// defensively — classification and trace reconstruction both degrade
/// gracefully rather than erroring on it.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum EngineOutput {
    Run(RunResult),
    Raw(Value),
}

impl EngineOutput {
    /// Interpret an untyped engine response.
    ///
    /// A JSON object with a string `final_output` is a recognized run result
    /// (items taken from its `items` array, each classified by
    /// [`RunItem::from_value`]); anything else is kept raw.
    pub fn from_value(value: Value) -> EngineOutput {
        let Some(final_output) = value.get("final_output").and_then(Value::as_str) else {
            return EngineOutput::Raw(value);
        };
        let items = value
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(RunItem::from_value).collect())
            .unwrap_or_default();
        EngineOutput::Run(RunResult::new(final_output, items))
    }

    /// The run result, if this output is one.
    pub fn as_run(&self) -> Option<&RunResult> {
        match self {
            EngineOutput::Run(r) => Some(r),
            EngineOutput::Raw(_) => None,
        }
    }
}

/// Render a JSON value as user-facing text: strings verbatim (no quotes),
/// everything else in compact JSON form.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Engine boundary ────────────────────────────────────────────────

/// Boxed future returned by [`AgentEngine::run`].
///
/// Type alias to keep trait signatures and implementations readable.
pub type EngineFuture<'a> = Pin<Box<dyn Future<Output = Result<EngineOutput, String>> + Send + 'a>>;

/// The agent-execution engine, invoked exactly once per turn.
///
/// The call suspends while the engine performs its (possibly multi-step,
/// possibly tool-invoking) reasoning, and completes only when the engine
/// returns a final result or fails. Failures propagate unchanged — no retry
/// happens at this boundary.
pub trait AgentEngine: Send + Sync {
    /// Run one turn: the user message plus the session handle that keys the
    /// engine's persisted conversation state.
    fn run<'a>(&'a self, message: &'a str, session: &'a SessionHandle) -> EngineFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_with_text_is_message() {
        let item = RunItem::from_value(&json!({"role": "user", "text": "hello"}));
        assert_eq!(
            item,
            RunItem::Message {
                role: "user".into(),
                text: "hello".into(),
            }
        );
    }

    #[test]
    fn item_with_args_is_tool_call() {
        let item = RunItem::from_value(&json!({
            "name": "plot", "args": {"x": 1}, "output": "ok"
        }));
        assert_eq!(
            item,
            RunItem::ToolCall {
                name: "plot".into(),
                args: json!({"x": 1}),
                output: Some(json!("ok")),
            }
        );
    }

    #[test]
    fn tool_call_without_name_or_output() {
        let item = RunItem::from_value(&json!({"args": {}}));
        assert_eq!(
            item,
            RunItem::ToolCall {
                name: "unknown_tool".into(),
                args: json!({}),
                output: None,
            }
        );
    }

    #[test]
    fn item_with_agent_is_handoff() {
        let item = RunItem::from_value(&json!({"agent": {"name": "analyst"}}));
        assert_eq!(
            item,
            RunItem::Handoff {
                target: Some(AgentRef::new("analyst")),
            }
        );
    }

    #[test]
    fn handoff_without_name_has_no_target() {
        let item = RunItem::from_value(&json!({"agent": {}}));
        assert_eq!(item, RunItem::Handoff { target: None });
    }

    #[test]
    fn handoff_never_shadows_message_or_tool_call() {
        // Priority order is total: text wins over everything, args over agent.
        let both = RunItem::from_value(&json!({
            "text": "msg", "args": {}, "agent": {"name": "a"}
        }));
        assert!(matches!(both, RunItem::Message { .. }));

        let tool_and_agent = RunItem::from_value(&json!({
            "args": {}, "agent": {"name": "a"}
        }));
        assert!(matches!(tool_and_agent, RunItem::ToolCall { .. }));
    }

    #[test]
    fn unrecognized_item_falls_back_to_raw() {
        let item = RunItem::from_value(&json!({"unexpected": 42}));
        assert_eq!(
            item,
            RunItem::Other {
                raw: r#"{"unexpected":42}"#.into(),
            }
        );
    }

    #[test]
    fn engine_output_recognizes_run_result() {
        let output = EngineOutput::from_value(json!({
            "final_output": "Hi there!",
            "items": [
                {"text": "hello", "role": "user"},
                {"name": "plot", "args": {"x": 1}},
            ],
        }));
        let run = output.as_run().unwrap();
        assert_eq!(run.final_output, "Hi there!");
        assert_eq!(run.items.len(), 2);
    }

    #[test]
    fn engine_output_without_final_output_is_raw() {
        let output = EngineOutput::from_value(json!({"path": "sales.png"}));
        assert!(output.as_run().is_none());
        assert_eq!(output, EngineOutput::Raw(json!({"path": "sales.png"})));
    }

    #[test]
    fn missing_items_defaults_to_empty() {
        let output = EngineOutput::from_value(json!({"final_output": "done"}));
        assert!(output.as_run().unwrap().items.is_empty());
    }

    #[test]
    fn render_value_strips_string_quotes() {
        assert_eq!(render_value(&json!("ok")), "ok");
        assert_eq!(render_value(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(render_value(&json!(3)), "3");
    }
}
