//! Chat orchestrator - bounded model/tool loop with streamed output.
//!
//! Each request runs on its own task. The task calls the model, relays text
//! as it arrives, runs any requested tools, feeds their results back and
//! calls the model again, up to a fixed number of steps. Everything the
//! caller sees arrives as [`ChatEvent`]s on a [`ChatStream`].

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::join_all;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::chat::{ChatEvent, ChatPhase, FinishReason, CHAT_TEMPERATURE, MAX_STEPS, SYSTEM_PROMPT};
use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::tools::{ToolCall, ToolResult};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, Message, RequestMetadata, ToolExecutionContext,
    ToolExecutor,
};

/// Message shown to end users when generation fails.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while generating the response.";

const EVENT_BUFFER: usize = 64;

/// Errors raised before any model call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// No model API key configured.
    #[error("GEMINI_API_KEY is not configured")]
    MissingModelCredential,

    /// The request carried no messages.
    #[error("messages must not be empty")]
    EmptyConversation,
}

/// Generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub temperature: f32,
    pub max_steps: u32,
    pub max_tokens: Option<u32>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            temperature: CHAT_TEMPERATURE,
            max_steps: MAX_STEPS,
            max_tokens: None,
        }
    }
}

/// Stream of events for one chat request.
///
/// Dropping it stops the generation task at its next send.
pub struct ChatStream {
    request_id: String,
    receiver: mpsc::Receiver<ChatEvent>,
}

impl ChatStream {
    /// Id used to correlate this request in logs.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Stream for ChatStream {
    type Item = ChatEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// Runs chat requests against a model and a tool executor.
pub struct ChatOrchestrator {
    provider: Option<Arc<dyn AIProvider>>,
    tools: Arc<dyn ToolExecutor>,
    settings: ChatSettings,
}

impl ChatOrchestrator {
    /// Creates an orchestrator. `provider` is `None` when no model
    /// credential is configured; requests then fail with
    /// [`ChatError::MissingModelCredential`].
    pub fn new(provider: Option<Arc<dyn AIProvider>>, tools: Arc<dyn ToolExecutor>) -> Self {
        Self {
            provider,
            tools,
            settings: ChatSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Whether a model is configured.
    pub fn has_model(&self) -> bool {
        self.provider.is_some()
    }

    /// Starts a chat request.
    ///
    /// The caller's messages are copied; tool round trips are appended to
    /// the copy only.
    pub fn handle(&self, messages: Vec<Message>) -> Result<ChatStream, ChatError> {
        let provider = self.provider.clone().ok_or(ChatError::MissingModelCredential)?;
        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        let request_id = Uuid::new_v4().to_string();
        let (tx, receiver) = mpsc::channel(EVENT_BUFFER);

        let run = ChatRun {
            provider,
            tools: Arc::clone(&self.tools),
            settings: self.settings.clone(),
            request_id: request_id.clone(),
            messages,
            phase: ChatPhase::AwaitingModel,
            tx,
        };

        tracing::info!(
            request_id = %request_id,
            messages = run.messages.len(),
            model = %run.provider.provider_info().model,
            "chat request started"
        );
        tokio::spawn(run.drive());

        Ok(ChatStream { request_id, receiver })
    }
}

/// Why a run stopped early.
#[derive(Debug, Error)]
enum RunError {
    #[error("receiver dropped")]
    Disconnected,
    #[error(transparent)]
    Provider(#[from] AIError),
    #[error(transparent)]
    Phase(#[from] ValidationError),
}

/// State of one request's generation task.
struct ChatRun {
    provider: Arc<dyn AIProvider>,
    tools: Arc<dyn ToolExecutor>,
    settings: ChatSettings,
    request_id: String,
    messages: Vec<Message>,
    phase: ChatPhase,
    tx: mpsc::Sender<ChatEvent>,
}

/// What one model step produced.
struct StepOutput {
    text: String,
    calls: Vec<ToolCall>,
    finish_reason: FinishReason,
}

impl ChatRun {
    async fn drive(mut self) {
        match self.run().await {
            Ok(()) => {}
            Err(RunError::Disconnected) => {
                tracing::debug!(request_id = %self.request_id, "client disconnected, stopping generation");
            }
            Err(e) => {
                tracing::error!(request_id = %self.request_id, error = %e, phase = ?self.phase, "chat request failed");
                if let Ok(next) = self.phase.transition_to(ChatPhase::Error) {
                    self.phase = next;
                }
                let _ = self
                    .tx
                    .send(ChatEvent::Error {
                        message: GENERIC_FAILURE_MESSAGE.to_string(),
                    })
                    .await;
            }
        }
    }

    async fn run(&mut self) -> Result<(), RunError> {
        let mut step = 0;

        loop {
            step += 1;
            let output = self.model_step(step).await?;

            self.emit(ChatEvent::StepFinished {
                step,
                finish_reason: output.finish_reason,
            })
            .await?;

            if output.calls.is_empty() {
                self.advance(ChatPhase::Done)?;
                tracing::info!(request_id = %self.request_id, steps = step, "chat request finished");
                return self
                    .emit(ChatEvent::Finished {
                        steps: step,
                        finish_reason: output.finish_reason,
                    })
                    .await;
            }

            self.advance(ChatPhase::AwaitingToolResult)?;
            self.run_tools(step, output.text, output.calls).await?;

            if step >= self.settings.max_steps {
                self.advance(ChatPhase::Done)?;
                tracing::warn!(request_id = %self.request_id, steps = step, "step limit reached");
                return self
                    .emit(ChatEvent::Finished {
                        steps: step,
                        finish_reason: FinishReason::ToolCalls,
                    })
                    .await;
            }

            self.advance(ChatPhase::AwaitingModel)?;
        }
    }

    /// Calls the model once and relays its output.
    async fn model_step(&mut self, step: u32) -> Result<StepOutput, RunError> {
        let mut request = CompletionRequest::new(RequestMetadata::new(&self.request_id, step))
            .with_messages(self.messages.clone())
            .with_system_prompt(self.settings.system_prompt.clone())
            .with_temperature(self.settings.temperature);
        if let Some(max) = self.settings.max_tokens {
            request = request.with_max_tokens(max);
        }
        for tool in self.tools.available_tools() {
            request = request.with_tool(tool);
        }

        let mut stream = self.provider.stream_complete(request).await?;
        self.advance(ChatPhase::StreamingText)?;

        let mut output = StepOutput {
            text: String::new(),
            calls: Vec::new(),
            finish_reason: FinishReason::Stop,
        };

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            if !chunk.delta.is_empty() {
                output.text.push_str(&chunk.delta);
                self.emit(ChatEvent::text(chunk.delta)).await?;
            }
            for call in chunk.tool_calls {
                self.emit(ChatEvent::ToolCall { call: call.clone() }).await?;
                output.calls.push(call);
            }
            if let Some(reason) = chunk.finish_reason {
                output.finish_reason = reason;
                if let Some(usage) = chunk.usage {
                    tracing::debug!(
                        request_id = %self.request_id,
                        step,
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "model step usage"
                    );
                }
                break;
            }
        }

        if !output.calls.is_empty() {
            output.finish_reason = FinishReason::ToolCalls;
        }
        Ok(output)
    }

    /// Runs the step's tool calls concurrently and records the round trip.
    async fn run_tools(&mut self, step: u32, text: String, calls: Vec<ToolCall>) -> Result<(), RunError> {
        let context = ToolExecutionContext::new(&self.request_id, step);
        let tools = Arc::clone(&self.tools);

        let results = join_all(calls.iter().map(|call| {
            let tools = Arc::clone(&tools);
            let context = &context;
            async move {
                match tools.execute(call, context).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(tool = %call.name(), error = %e, "tool call could not be executed");
                        let query = call.arguments().get("query").and_then(|q| q.as_str()).unwrap_or_default();
                        ToolResult::failed(query, e.to_string())
                    }
                }
            }
        }))
        .await;

        self.messages.push(Message::assistant_tool_calls(text, calls.clone()));
        for (call, result) in calls.into_iter().zip(results) {
            self.messages.push(Message::tool(call.id(), result.to_json().to_string()));
            self.emit(ChatEvent::ToolResult {
                tool_call_id: call.id().to_string(),
                result,
            })
            .await?;
        }
        Ok(())
    }

    fn advance(&mut self, target: ChatPhase) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(target)?;
        Ok(())
    }

    async fn emit(&self, event: ChatEvent) -> Result<(), RunError> {
        self.tx.send(event).await.map_err(|_| RunError::Disconnected)
    }
}
