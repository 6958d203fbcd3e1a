//! Line encoding for the AI data-stream protocol (version 1).
//!
//! Each [`ChatEvent`] becomes one line `<code>:<json>\n`:
//!
//! | code | event          | payload                                   |
//! |------|----------------|-------------------------------------------|
//! | `0`  | text delta     | JSON string                               |
//! | `9`  | tool call      | `{toolCallId, toolName, args}`            |
//! | `a`  | tool result    | `{toolCallId, result}`                    |
//! | `e`  | step finished  | `{finishReason, isContinued}`             |
//! | `d`  | finished       | `{finishReason}`                          |
//! | `3`  | error          | JSON string                               |

use axum::http::HeaderName;
use serde_json::json;

use crate::domain::chat::{ChatEvent, FinishReason};

/// Header announcing the protocol to clients.
pub const DATA_STREAM_HEADER: HeaderName = HeaderName::from_static("x-vercel-ai-data-stream");

/// Protocol version sent in [`DATA_STREAM_HEADER`].
pub const DATA_STREAM_VERSION: &str = "v1";

/// Encodes one event as a protocol line, including the trailing newline.
pub fn encode_event(event: &ChatEvent) -> String {
    let (code, payload) = match event {
        ChatEvent::TextDelta { delta } => ('0', json!(delta)),
        ChatEvent::ToolCall { call } => (
            '9',
            json!({
                "toolCallId": call.id(),
                "toolName": call.name(),
                "args": call.arguments(),
            }),
        ),
        ChatEvent::ToolResult { tool_call_id, result } => (
            'a',
            json!({
                "toolCallId": tool_call_id,
                "result": result.to_json(),
            }),
        ),
        ChatEvent::StepFinished { finish_reason, .. } => (
            'e',
            json!({
                "finishReason": finish_reason_str(*finish_reason),
                "isContinued": false,
            }),
        ),
        ChatEvent::Finished { finish_reason, .. } => (
            'd',
            json!({ "finishReason": finish_reason_str(*finish_reason) }),
        ),
        ChatEvent::Error { message } => ('3', json!(message)),
    };

    format!("{code}:{payload}\n")
}

fn finish_reason_str(reason: FinishReason) -> &'static str {
    match reason {
        FinishReason::Stop => "stop",
        FinishReason::Length => "length",
        FinishReason::ContentFilter => "content-filter",
        FinishReason::ToolCalls => "tool-calls",
        FinishReason::Error => "error",
    }
}
