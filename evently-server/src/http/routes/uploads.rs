//! Upload-service callback
//!
//! File storage lives in an external service; it calls back here when an
//! upload completes. We acknowledge and log - nothing to persist yet, the
//! event record references uploads by URL.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::state::AppState;

/// POST /api/uploadthing and anything nested beneath it
async fn callback(State(_state): State<AppState>, Json(payload): Json<Value>) -> StatusCode {
    let kind = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    tracing::info!(kind, "upload callback received");
    StatusCode::ACCEPTED
}

/// Upload callback routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/uploadthing", post(callback))
        .route("/api/uploadthing/{*rest}", post(callback))
}
