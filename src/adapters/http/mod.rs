//! HTTP adapters - REST API implementations.
//!
//! - `POST /api/chat` - streamed chat answer (data-stream protocol)
//! - `POST /api/search` - direct document search
//! - `GET /health` - liveness

pub mod chat;
pub mod error;
pub mod search;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::{ChatOrchestrator, DocumentSearchService};
use crate::config::ServerConfig;

pub use chat::chat_routes;
pub use error::{ApiError, ErrorResponse, CHAT_FAILURE_MESSAGE};
pub use search::search_routes;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatOrchestrator>,
    pub search: Arc<DocumentSearchService>,
}

impl AppState {
    pub fn new(chat: Arc<ChatOrchestrator>, search: Arc<DocumentSearchService>) -> Self {
        Self { chat, search }
    }
}

/// All routes, without middleware.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", chat_routes().merge(search_routes()))
        .with_state(state)
}

/// All routes with trace, CORS and timeout layers.
///
/// The timeout bounds the time to response headers; a chat body keeps
/// streaming after that.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    api_router(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
