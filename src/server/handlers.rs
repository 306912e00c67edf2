//! HTTP request handlers
//!
//! Implementation of HTTP endpoints for the relay server.

use crate::{
    server::app::AppState,
    types::{ChatRequest, ErrorResponse, PingResponse, StatusResponse},
    utils::version,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Chat relay endpoint
///
/// POST /chat
///
/// Forwards the submitted message upstream and returns the normalized
/// reply.
pub async fn chat(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    // Parse JSON manually so malformed bodies map to 400 with a
    // structured error instead of axum's default rejection.
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Failed to deserialize chat request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_context(
                    format!("Invalid JSON: {}", e),
                    "json_deserialization",
                )),
            )
                .into_response();
        }
    };

    tracing::debug!("Received chat request ({} bytes)", body.len());

    match state.relay.relay(&request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            tracing::error!("Chat relay failed: {}", e);
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(ErrorResponse::with_context(e.to_string(), e.category())),
            )
                .into_response()
        }
    }
}

/// Index endpoint
///
/// GET /
///
/// Returns a short status message confirming the relay is running.
pub async fn index() -> Json<StatusResponse> {
    Json(StatusResponse::online())
}

/// Ping endpoint for health checks
///
/// GET /ping
///
/// Returns server status and uptime information.
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let response = PingResponse::new(uptime, version::get_version());

    tracing::debug!(
        "Ping response: uptime={}s, version={}",
        uptime,
        version::get_version()
    );
    Json(response)
}
