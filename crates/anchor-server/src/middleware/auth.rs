use crate::error::ApiError;
use crate::state::AppState;
use anchor_credentials::bearer_token;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Axum middleware guarding protected routes:
/// - require `Authorization: Bearer <access token>`
/// - verify it as an access credential
/// - expose the `Authenticated` identity to the handler via extensions
///
/// On any failure the request is answered with 401 and the handler never runs.
pub async fn require_access_token(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        tracing::debug!(path = %req.uri().path(), "missing bearer token");
        ApiError::Unauthorized
    })?;

    let authenticated = state.credentials.authenticate(&token)?;

    req.extensions_mut().insert(authenticated);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
}
