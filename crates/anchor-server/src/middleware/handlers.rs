use crate::error::ApiError;
use crate::state::AppState;
use anchor_credentials::{Authenticated, TokenPair};
use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub subject: String,
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "anchor-server" }))
}

/// Exchange trusted client credentials for a new credential pair.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    if !state.verify_client(&body.client_id, &body.client_secret) {
        tracing::warn!(client_id = %body.client_id, "login rejected");
        return Err(ApiError::Unauthorized);
    }

    let pair = state.credentials.login(&body.client_id)?;
    tracing::info!(subject = %body.client_id, "login succeeded");
    Ok(Json(pair))
}

/// Rotate a refresh credential.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    if body.refresh_token.trim().is_empty() {
        return Err(ApiError::InvalidRequest("refresh_token is empty".to_string()));
    }
    Ok(Json(state.credentials.refresh(&body.refresh_token)?))
}

/// Revoke every refresh credential of a subject.
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Authenticated>,
    Json(body): Json<RevokeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let revoked = state.credentials.revoke_all(&body.subject);
    tracing::info!(caller = %caller.subject, subject = %body.subject, revoked, "revoke requested");

    Ok(Json(json!({
        "subject": body.subject,
        "revoked": revoked,
    })))
}

pub async fn whoami(Extension(caller): Extension<Authenticated>) -> Json<serde_json::Value> {
    Json(json!({
        "subject": caller.subject,
        "credential_id": caller.claims.jti,
        "issued_at": caller.claims.issued_at(),
        "expires_at": caller.claims.expires_at(),
    }))
}
