//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Streaming, tool-calling language model
//! - `SearchBackend` - Managed document search engine
//! - `UrlSigner` - Time-limited download URL signing
//! - `ToolExecutor` - Dispatch of model-invoked tools

mod ai_provider;
mod search_backend;
mod tool_executor;
mod url_signer;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, Message, MessageRole,
    ProviderInfo, RequestMetadata, StreamChunk, TokenUsage,
};
pub use search_backend::{
    serving_config_path, SearchBackend, SearchBackendError, SearchRequest, SearchResponse,
};
pub use tool_executor::{ToolExecutionContext, ToolExecutionError, ToolExecutor};
pub use url_signer::{CredentialRef, SignUrlRequest, SigningError, UrlSigner};
