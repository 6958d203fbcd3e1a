//! Axum routes for the chat endpoint.

use axum::routing::post;
use axum::Router;

use super::handlers::chat;
use crate::adapters::http::AppState;

/// Creates routes for chat.
///
/// - POST /chat - streamed chat answer
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}
