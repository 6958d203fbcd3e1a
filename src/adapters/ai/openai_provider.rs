//! OpenAI-compatible Provider - Implementation of AIProvider for chat
//! completion APIs that speak the OpenAI wire format.
//!
//! The default configuration targets Gemini through its OpenAI-compatible
//! endpoint; any other compatible base URL works the same way.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_base_url("https://generativelanguage.googleapis.com/v1beta/openai");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events (SSE) for streaming responses. Bytes are buffered
//! until a full line is available, so multi-byte characters and JSON payloads
//! split across network reads decode correctly. Tool call fragments are
//! accumulated by index and emitted whole once the model finishes its turn.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::domain::tools::ToolCall;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, Message, MessageRole,
    ProviderInfo, StreamChunk, TokenUsage,
};

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default base URL (Gemini's OpenAI-compatible surface).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures before the stream opens.
    pub max_retries: u32,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to the wire format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(OpenAIMessage::from(&Message::system(prompt.clone())));
        }
        messages.extend(request.messages.iter().map(OpenAIMessage::from));

        let tools: Vec<serde_json::Value> =
            request.tools.iter().map(|t| t.to_openai_format()).collect();

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tool_choice: (!tools.is_empty()).then(|| "auto".to_string()),
            tools,
            stream: true,
            stream_options: StreamOptions {
                include_usage: true,
            },
        }
    }

    /// Sends a streaming request.
    async fn send_streaming_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let body = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Opens the stream, checking the response status.
    async fn open_stream(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let response = self.send_streaming_request(request).await?;
        Self::handle_response_status(response).await
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => {
                let retry_after = Self::parse_retry_after(&error_body);
                Err(AIError::rate_limited(retry_after))
            }
            400 => {
                if error_body.contains("API_KEY_INVALID") || error_body.contains("API key not valid") {
                    Err(AIError::AuthenticationFailed)
                } else if error_body.contains("maximum context length")
                    || error_body.contains("context_length_exceeded")
                    || error_body.contains("exceeds the maximum number of tokens")
                {
                    Err(AIError::ContextTooLong)
                } else {
                    Err(AIError::InvalidRequest(error_body))
                }
            }
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(msg) = parsed.get("error").and_then(|e| e.get("message")) {
                if let Some(s) = msg.as_str() {
                    if let Some(idx) = s.find("try again in ") {
                        let rest = &s[idx + 13..];
                        if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                            if let Ok(secs) = rest[..num_end].parse::<u32>() {
                                return secs;
                            }
                        }
                    }
                }
            }
        }
        30
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<CompletionStream, AIError> {
        let mut retry_count = 0;

        // Retries only cover opening the stream; once bytes flow, errors are
        // surfaced to the caller.
        let response = loop {
            match self.open_stream(&request).await {
                Ok(response) => break response,
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    tracing::warn!(
                        request_id = %request.metadata.request_id,
                        step = request.metadata.step,
                        attempt = retry_count + 1,
                        error = %err,
                        "model request failed, retrying"
                    );
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            sleep(Duration::from_secs(1 << retry_count)).await;
            retry_count += 1;
        };

        let body = response.bytes_stream().boxed();

        let stream = stream::unfold(
            (body, SseDecoder::default(), false),
            |(mut body, mut decoder, ended)| async move {
                if ended {
                    return None;
                }
                match body.next().await {
                    Some(Ok(bytes)) => {
                        let items = decoder.feed(&bytes);
                        Some((items, (body, decoder, false)))
                    }
                    Some(Err(e)) => Some((
                        vec![Err(AIError::network(format!("Stream error: {}", e)))],
                        (body, decoder, true),
                    )),
                    None => {
                        let items = decoder.finish();
                        Some((items, (body, decoder, true)))
                    }
                }
            },
        )
        .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai-compatible", &self.config.model).with_functions(true)
    }
}

/// Incremental SSE decoder.
///
/// Holds bytes of an incomplete line, partially streamed tool calls, and the
/// finish reason and usage until the stream is finalized.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    pending_calls: BTreeMap<usize, PartialToolCall>,
    unindexed_base: usize,
    emitted_calls: bool,
    finish_reason: Option<FinishReason>,
    usage: Option<TokenUsage>,
    finalized: bool,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl SseDecoder {
    /// Consumes a network read and returns the chunks it completes.
    fn feed(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk, AIError>> {
        self.buffer.extend_from_slice(bytes);

        let mut results = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            self.decode_line(line.trim_end_matches(['\r', '\n']), &mut results);
        }
        results
    }

    /// Flushes whatever is left once the body ends.
    fn finish(&mut self) -> Vec<Result<StreamChunk, AIError>> {
        let mut results = Vec::new();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            self.decode_line(line.trim_end_matches(['\r', '\n']), &mut results);
        }
        self.finalize(&mut results);
        results
    }

    fn decode_line(&mut self, line: &str, results: &mut Vec<Result<StreamChunk, AIError>>) {
        if self.finalized {
            return;
        }
        let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
            return;
        };

        if data == "[DONE]" {
            self.finalize(results);
            return;
        }
        if data.trim().is_empty() {
            return;
        }

        let chunk = match serde_json::from_str::<StreamResponseChunk>(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                results.push(Err(AIError::parse(format!("Failed to parse SSE chunk: {}", e))));
                return;
            }
        };

        if let Some(usage) = chunk.usage {
            self.usage = Some(TokenUsage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                if !content.is_empty() {
                    results.push(Ok(StreamChunk::content(content)));
                }
            }

            for (position, fragment) in choice.delta.tool_calls.into_iter().enumerate() {
                let key = match fragment.index {
                    Some(index) => index,
                    None => self.unindexed_key(fragment.id.as_deref(), position),
                };
                let entry = self.pending_calls.entry(key).or_default();
                if let Some(id) = fragment.id.filter(|id| !id.is_empty()) {
                    entry.id = id;
                }
                if let Some(function) = fragment.function {
                    if let Some(name) = function.name {
                        entry.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        entry.arguments.push_str(&arguments);
                    }
                }
            }

            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(map_finish_reason(&reason));
                self.flush_tool_calls(results);
            }
        }
    }

    /// Key for a fragment sent without `index`.
    ///
    /// Fragments are keyed by their position in the chunk. A fragment whose id
    /// differs from the call already held at that key starts a new call after
    /// every pending one.
    fn unindexed_key(&mut self, id: Option<&str>, position: usize) -> usize {
        let key = self.unindexed_base + position;
        let starts_new_call = match (id.filter(|id| !id.is_empty()), self.pending_calls.get(&key)) {
            (Some(id), Some(held)) => !held.id.is_empty() && held.id != id,
            _ => false,
        };
        if starts_new_call {
            let next = self.pending_calls.keys().next_back().map_or(0, |last| last + 1);
            self.unindexed_base = next.saturating_sub(position);
        }
        self.unindexed_base + position
    }

    fn flush_tool_calls(&mut self, results: &mut Vec<Result<StreamChunk, AIError>>) {
        self.unindexed_base = 0;
        if self.pending_calls.is_empty() {
            return;
        }
        let calls = std::mem::take(&mut self.pending_calls)
            .into_values()
            .map(PartialToolCall::assemble)
            .collect();
        self.emitted_calls = true;
        results.push(Ok(StreamChunk::tool_calls(calls)));
    }

    fn finalize(&mut self, results: &mut Vec<Result<StreamChunk, AIError>>) {
        if self.finalized {
            return;
        }
        self.flush_tool_calls(results);
        self.finalized = true;

        // Some compatible backends report "stop" on a turn that called tools.
        let reason = if self.emitted_calls {
            FinishReason::ToolCalls
        } else {
            self.finish_reason.unwrap_or(FinishReason::Stop)
        };
        results.push(Ok(StreamChunk::final_chunk(reason, self.usage.take())));
    }
}

impl PartialToolCall {
    fn assemble(self) -> ToolCall {
        let id = if self.id.is_empty() {
            format!("call_{}", uuid::Uuid::new_v4().simple())
        } else {
            self.id
        };
        let arguments = if self.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            // Unparseable arguments are passed through; the tool reports them.
            serde_json::from_str(&self.arguments)
                .unwrap_or(serde_json::Value::String(self.arguments))
        };
        ToolCall::new(id, self.name, arguments)
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

// ----- Wire Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAIToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&Message> for OpenAIMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        };
        // Assistant turns that only call tools carry no content.
        let content = if msg.content.is_empty() && !msg.tool_calls.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            role,
            content,
            tool_calls: msg.tool_calls.iter().map(OpenAIToolCall::from).collect(),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

impl From<&ToolCall> for OpenAIToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id().to_string(),
            kind: "function",
            function: OpenAIFunctionCall {
                name: call.name().to_string(),
                arguments: call.arguments().to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallFragment>,
}

#[derive(Debug, Deserialize)]
struct ToolCallFragment {
    index: Option<usize>,
    id: Option<String>,
    function: Option<FunctionFragment>,
}

#[derive(Debug, Deserialize)]
struct FunctionFragment {
    name: Option<String>,
    arguments: Option<String>,
}
