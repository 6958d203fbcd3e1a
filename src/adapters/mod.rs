//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - model providers (OpenAI-compatible streaming, mock)
//! - `search` - search backends (Vertex AI Search, in-memory)
//! - `storage` - URL signers (GCS V4 HMAC, fake)
//! - `http` - axum router and handlers

pub mod ai;
pub mod http;
pub mod search;
pub mod storage;
