//! HTTP handler for direct document search.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::SearchError;

use super::dto::{SearchRequestBody, SearchResponseBody};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::AppState;

/// Searches documents without involving the model.
///
/// POST /api/search
pub async fn search_documents(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequestBody>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return ApiError::bad_request(rejection.body_text()).into_response(),
    };

    match state.search.search(&request.query, request.max_results).await {
        Ok(hits) => Json(SearchResponseBody::new(request.query.trim(), hits)).into_response(),
        Err(e) => search_error(e).into_response(),
    }
}

fn search_error(error: SearchError) -> ApiError {
    let status = match error {
        SearchError::EmptyQuery | SearchError::InvalidMaxResults(_) => StatusCode::BAD_REQUEST,
        SearchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SearchError::Configuration(_) | SearchError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, error.to_string())
}
