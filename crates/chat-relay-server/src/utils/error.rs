use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::chat::ChatResponse;

/// Reply body sent with every 500; internal detail never reaches the client.
pub const SERVER_ERROR_REPLY: &str = "Server error.";

pub const MISSING_FIELDS_MESSAGE: &str = "Message and userId are required";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: msg })).into_response()
            }
        }
    }
}

pub fn server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ChatResponse {
            reply: SERVER_ERROR_REPLY.to_string(),
            sources: Vec::new(),
        }),
    )
        .into_response()
}

/// Failures of the outbound search / chat-completion clients.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} credential is not configured")]
    NotConfigured(&'static str),

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
}
