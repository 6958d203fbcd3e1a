//! Request types for the chat endpoint.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::tools::ToolCall;
use crate::ports::{Message, MessageRole};

/// `POST /api/chat` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// One conversation message as sent by chat clients.
///
/// Assistant turns carry the tools they called in `toolInvocations`. Other
/// client fields (`id`, `parts`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_invocations: Vec<ToolInvocation>,
}

/// A tool call made in an earlier turn, with its result once it has one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default = "empty_args")]
    pub args: Value,
    #[serde(default)]
    pub result: Option<Value>,
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

impl ChatMessage {
    /// Expands the message into model messages.
    ///
    /// An assistant turn with answered tool calls becomes the assistant
    /// message holding those calls, followed by one tool message per result.
    /// Calls still waiting for a result are dropped.
    fn into_messages(self) -> Vec<Message> {
        let answered: Vec<ToolInvocation> = self
            .tool_invocations
            .into_iter()
            .filter(|invocation| invocation.result.is_some())
            .collect();
        if self.role != MessageRole::Assistant || answered.is_empty() {
            return vec![Message::new(self.role, self.content)];
        }

        let calls = answered
            .iter()
            .map(|invocation| {
                ToolCall::new(
                    invocation.tool_call_id.clone(),
                    invocation.tool_name.clone(),
                    invocation.args.clone(),
                )
            })
            .collect();

        let mut messages = vec![Message::assistant_tool_calls(self.content, calls)];
        messages.extend(answered.into_iter().filter_map(|invocation| {
            invocation
                .result
                .map(|result| Message::tool(invocation.tool_call_id, result.to_string()))
        }));
        messages
    }
}

impl ChatRequest {
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
            .into_iter()
            .flat_map(ChatMessage::into_messages)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_client_messages_with_extra_fields() {
        let json = r#"{
            "id": "chat-1",
            "messages": [
                {"id": "m1", "role": "user", "content": "エアコンのマニュアル", "parts": []},
                {"role": "assistant", "content": "Searching"}
            ]
        }"#;

        let req: ChatRequest = serde_json::from_str(json).unwrap();
        let messages = req.into_messages();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("エアコンのマニュアル"));
        assert_eq!(messages[1], Message::assistant("Searching"));
    }

    #[test]
    fn earlier_tool_calls_and_results_are_kept() {
        let result = json!({
            "success": true,
            "query": "aircon",
            "count": 1,
            "documents": [{"title": "Manual", "fileName": "a.pdf", "downloadUrl": "https://signed.test/a.pdf"}]
        });
        let req: ChatRequest = serde_json::from_value(json!({
            "messages": [
                {"role": "user", "content": "エアコンのマニュアル"},
                {
                    "role": "assistant",
                    "content": "Here is the manual.",
                    "toolInvocations": [{
                        "state": "result",
                        "toolCallId": "c1",
                        "toolName": "searchDocuments",
                        "args": {"query": "aircon"},
                        "result": result
                    }]
                },
                {"role": "user", "content": "send the link again"}
            ]
        }))
        .unwrap();

        let messages = req.into_messages();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Here is the manual.");
        assert_eq!(messages[1].tool_calls.len(), 1);
        assert_eq!(messages[1].tool_calls[0].id(), "c1");
        assert_eq!(messages[1].tool_calls[0].name(), "searchDocuments");
        assert_eq!(messages[1].tool_calls[0].arguments()["query"], "aircon");
        assert_eq!(messages[2].role, MessageRole::Tool);
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("c1"));
        assert!(messages[2].content.contains("https://signed.test/a.pdf"));
        assert_eq!(messages[3], Message::user("send the link again"));
    }

    #[test]
    fn pending_tool_calls_are_dropped() {
        let req: ChatRequest = serde_json::from_value(json!({
            "messages": [{
                "role": "assistant",
                "content": "",
                "toolInvocations": [{"state": "call", "toolCallId": "c2", "toolName": "searchDocuments"}]
            }]
        }))
        .unwrap();

        let messages = req.into_messages();

        assert_eq!(messages, vec![Message::assistant("")]);
    }

    #[test]
    fn missing_messages_is_rejected() {
        assert!(serde_json::from_str::<ChatRequest>("{}").is_err());
    }
}
