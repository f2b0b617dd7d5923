//! # anchor-server
//!
//! HTTP transport for Anchor credentials.
//!
//! | Route | Auth | Purpose |
//! |-------|------|---------|
//! | `GET /healthz` | none | liveness |
//! | `POST /auth/login` | client id + secret | mint a pair in a new lineage |
//! | `POST /auth/refresh` | refresh credential in body | rotate |
//! | `POST /auth/revoke` | bearer access credential | revoke a subject |
//! | `GET /auth/whoami` | bearer access credential | echo the caller |

pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use middleware::{auth::require_access_token, handlers};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the router over shared state.
pub fn app(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/auth/revoke", post(handlers::revoke))
        .route("/auth/whoami", get(handlers::whoami))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_access_token,
        ));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
