//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Scripted text and tool-call turns
//! - Simulated delays for timeout testing
//! - Error injection, both before and during streaming
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_tool_call("searchDocuments", json!({"query": "manual"}))
//!     .with_response("Here is the manual.");
//!
//! let stream = provider.stream_complete(request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::tools::ToolCall;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, ProviderInfo,
    StreamChunk, TokenUsage,
};

/// Mock AI provider for testing.
///
/// Configurable to return specific responses, simulate delays, or inject errors.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Returned once the queue is exhausted.
    fallback: MockResponse,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream text, then finish.
    Text {
        content: String,
        finish_reason: FinishReason,
    },
    /// Optionally stream text, then request tool calls.
    ToolCalls {
        content: String,
        calls: Vec<ToolCall>,
    },
    /// Fail before the stream opens.
    Error(MockError),
    /// Stream some text, then fail mid-stream.
    StreamError { content: String, error: MockError },
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate context too long.
    ContextTooLong,
    /// Simulate content filtering.
    ContentFiltered { reason: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong => AIError::ContextTooLong,
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn word_chunks(content: &str) -> Vec<Result<StreamChunk, AIError>> {
    content
        .split_inclusive(' ')
        .map(|s| Ok(StreamChunk::content(s)))
        .collect()
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            fallback: MockResponse::Text {
                content: "Mock response".to_string(),
                finish_reason: FinishReason::Stop,
            },
            info: ProviderInfo::new("mock", "mock-model-1").with_functions(true),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a text response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Text {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Adds a single tool call turn to the queue.
    pub fn with_tool_call(self, name: &str, arguments: serde_json::Value) -> Self {
        let id = format!("call_{}", lock(&self.responses).len() + 1);
        self.push(MockResponse::ToolCalls {
            content: String::new(),
            calls: vec![ToolCall::new(id, name, arguments)],
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds any response to the queue.
    pub fn push(self, response: MockResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    /// Sets the response returned after the queue is exhausted.
    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Gets the next response or the fallback.
    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<CompletionStream, AIError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let usage = Some(TokenUsage::new(10, 20));

        match self.next_response() {
            MockResponse::Text {
                content,
                finish_reason,
            } => {
                let mut chunks = word_chunks(&content);
                chunks.push(Ok(StreamChunk::final_chunk(finish_reason, usage)));
                Ok(Box::pin(stream::iter(chunks)))
            }
            MockResponse::ToolCalls { content, calls } => {
                let mut chunks = word_chunks(&content);
                chunks.push(Ok(StreamChunk::tool_calls(calls)));
                chunks.push(Ok(StreamChunk::final_chunk(FinishReason::ToolCalls, usage)));
                Ok(Box::pin(stream::iter(chunks)))
            }
            MockResponse::StreamError { content, error } => {
                let chunks = stream::iter(word_chunks(&content));
                let failure = stream::once(async move { Err(AIError::from(error)) });
                Ok(Box::pin(chunks.chain(failure)))
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
