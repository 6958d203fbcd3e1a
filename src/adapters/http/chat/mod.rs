//! HTTP adapter for the chat endpoint.

pub mod data_stream;
pub mod dto;
pub mod handlers;
pub mod routes;

pub use data_stream::{encode_event, DATA_STREAM_HEADER, DATA_STREAM_VERSION};
pub use dto::{ChatMessage, ChatRequest};
pub use routes::chat_routes;
