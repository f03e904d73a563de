use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::ConversationManager;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// `POST /api/chat`
///
/// Only a missing message/userId is an error (400). Degraded dependencies
/// still produce a 200 with a fallback reply; panics are turned into the
/// generic 500 by the router's panic layer.
pub async fn chat_handler(
    State(manager): State<Arc<ConversationManager>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Chat body rejected: {}", rejection.body_text());
            return rejection.into_response();
        }
        Err(rejection) => {
            warn!("Chat body is not valid JSON: {}", rejection.body_text());
            Value::Null
        }
    };

    let request = match ChatRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let outcome = manager.handle_message(&request).await;

    Json(ChatResponse {
        reply: outcome.reply,
        sources: outcome.sources,
    })
    .into_response()
}
