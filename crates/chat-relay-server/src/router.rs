use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;
use crate::utils::error::server_error_response;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::Response,
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{error, warn};

pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::chat_handler))
        .route("/health", get(handlers::health::api_health_check));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes)
        .with_state(state)
        // Innermost so the generic 500 still goes through CORS and tracing
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(cors_layer(&server.allowed_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    error!("Chat route panicked: {}", detail);
    server_error_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_invalid_origins_are_skipped() {
        // Construction must not panic on a bad entry
        let _layer = cors_layer(&["http://localhost:5173".to_string(), "bad\norigin".to_string()]);
    }

    #[test]
    fn test_panic_payloads_map_to_generic_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let response = handle_panic(Box::new(String::from("owned boom")));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
