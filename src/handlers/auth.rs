use crate::auth::validator::validate;
use crate::core::error::AuthError;
use crate::core::state::AppState;
use crate::utils::time::today;
use axum::{body::Bytes, extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub auth: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthOkResponse {
    pub ok: bool,
    pub id: String,
}

/// Authentication handler
///
/// POST /auth with body `{"auth": "<username>:<password>"}`.
///
/// # Flow
/// 1. Parse the JSON body and extract the auth string
/// 2. Refresh the directory snapshot (stale fallback on fetch failure)
/// 3. Run the credential rule chain against the snapshot
#[instrument(skip(state, body))]
pub async fn auth_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AuthOkResponse>, AuthError> {
    let request: AuthRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejecting unparseable auth body");
        AuthError::InvalidJson
    })?;

    let auth = request
        .auth
        .filter(|auth| !auth.is_empty())
        .ok_or_else(|| {
            warn!("Rejecting auth request without auth field");
            AuthError::MissingAuthField
        })?;

    let snapshot = state.directory.refresh().await;
    debug!(users = snapshot.len(), "Validating credential against snapshot");

    match validate(&auth, &snapshot, today()) {
        Ok(username) => {
            info!(username = %username, "User authenticated");
            Ok(Json(AuthOkResponse {
                ok: true,
                id: username.to_string(),
            }))
        }
        Err(reason) => {
            warn!(reason = %reason, "Authentication rejected");
            Err(AuthError::Validation(reason))
        }
    }
}
