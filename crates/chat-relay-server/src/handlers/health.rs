use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    ts: i64,
}

/// `GET /health`
pub async fn health_check() -> &'static str {
    "ok"
}

/// `GET /api/health`
pub async fn api_health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            ts: chrono::Utc::now().timestamp_millis(),
        }),
    )
}
