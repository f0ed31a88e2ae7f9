use crate::core::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub users_count: usize,
}

/// Health check handler
///
/// GET /health
///
/// Refreshes the directory on the way so the reported user count reflects
/// the panel (or the stale fallback when the panel is down).
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.directory.refresh().await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            users_count: snapshot.len(),
        }),
    )
}
