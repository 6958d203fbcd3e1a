//! Axum routes for direct search.

use axum::routing::post;
use axum::Router;

use super::handlers::search_documents;
use crate::adapters::http::AppState;

/// - POST /search - normalized hits plus a plain-text rendering
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", post(search_documents))
}
