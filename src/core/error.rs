// Centralized error handling for the authentication service

use crate::auth::validator::AuthReason;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the `/auth` endpoint.
///
/// Upstream fetch failures never appear here: the directory cache recovers
/// them internally by serving the last known snapshot.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Auth field missing")]
    MissingAuthField,

    #[error(transparent)]
    Validation(AuthReason),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct AuthFailureBody {
    pub ok: bool,
    pub msg: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidJson | AuthError::MissingAuthField => StatusCode::BAD_REQUEST,
            AuthError::Validation(_) => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let msg = match &self {
            // Never leak internal detail to the caller.
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(AuthFailureBody { ok: false, msg })).into_response()
    }
}
