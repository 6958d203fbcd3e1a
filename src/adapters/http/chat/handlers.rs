//! HTTP handler for the chat endpoint.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;

use crate::application::ChatError;

use super::data_stream::{encode_event, DATA_STREAM_HEADER, DATA_STREAM_VERSION};
use super::dto::ChatRequest;
use crate::adapters::http::error::{ApiError, CHAT_FAILURE_MESSAGE};
use crate::adapters::http::AppState;

/// Streams a chat answer.
///
/// POST /api/chat
pub async fn chat(State(state): State<AppState>, payload: Result<Json<ChatRequest>, JsonRejection>) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected chat request body");
            return ApiError::internal(CHAT_FAILURE_MESSAGE)
                .with_details(rejection.body_text())
                .into_response();
        }
    };

    let stream = match state.chat.handle(request.into_messages()) {
        Ok(stream) => stream,
        Err(e) => return chat_error(e).into_response(),
    };

    tracing::debug!(request_id = %stream.request_id(), "streaming chat response");
    let body = Body::from_stream(stream.map(|event| Ok::<_, Infallible>(encode_event(&event))));

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (DATA_STREAM_HEADER, DATA_STREAM_VERSION),
        ],
        body,
    )
        .into_response()
}

fn chat_error(error: ChatError) -> ApiError {
    match error {
        ChatError::MissingModelCredential => {
            tracing::error!("chat request rejected: model API key is not configured");
            ApiError::internal(error.to_string())
        }
        ChatError::EmptyConversation => ApiError::internal(CHAT_FAILURE_MESSAGE).with_details(error.to_string()),
    }
}
