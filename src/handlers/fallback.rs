use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub async fn fallback_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "ok": false,
            "msg": "Not found. Valid endpoints: /auth, /health",
        })),
    )
        .into_response()
}
