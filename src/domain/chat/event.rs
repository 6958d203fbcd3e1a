//! Events emitted by the chat orchestrator while a request is running.

use serde::{Deserialize, Serialize};

use crate::domain::tools::{ToolCall, ToolResult};

/// Reason a model step or the whole interaction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit the token limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// The model asked for tool calls.
    ToolCalls,
    /// An error occurred.
    Error,
}

/// One event on a chat response stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Incremental model text.
    TextDelta { delta: String },
    /// The model invoked a tool.
    ToolCall { call: ToolCall },
    /// A tool finished; `result` is exactly what the model receives.
    ToolResult { tool_call_id: String, result: ToolResult },
    /// A model step ended.
    StepFinished { step: u32, finish_reason: FinishReason },
    /// The interaction ended.
    Finished { steps: u32, finish_reason: FinishReason },
    /// The interaction failed; `message` is safe to show to end users.
    Error { message: String },
}

impl ChatEvent {
    /// Creates a text delta event.
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta { delta: delta.into() }
    }

    /// Returns true for the events that end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_reason_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&FinishReason::ToolCalls).unwrap(), "\"tool-calls\"");
        assert_eq!(serde_json::to_string(&FinishReason::ContentFilter).unwrap(), "\"content-filter\"");
        assert_eq!(serde_json::to_string(&FinishReason::Stop).unwrap(), "\"stop\"");
    }

    #[test]
    fn terminal_events() {
        assert!(ChatEvent::Error { message: "x".to_string() }.is_terminal());
        assert!(ChatEvent::Finished { steps: 1, finish_reason: FinishReason::Stop }.is_terminal());
        assert!(!ChatEvent::text("hi").is_terminal());
    }

    #[test]
    fn text_delta_serializes_with_type_tag() {
        let json = serde_json::to_value(ChatEvent::text("hi")).unwrap();
        assert_eq!(json["type"], "text_delta");
        assert_eq!(json["delta"], "hi");
    }
}
