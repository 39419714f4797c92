//! HTTP routes.

pub mod certificates;
pub mod docs;
pub mod health;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::middleware::log_requests;
use crate::state::SharedState;

/// Builds the gateway router.
pub fn router(state: SharedState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/docs", get(docs::swagger_ui))
        .route("/docs/openapi.yaml", get(docs::openapi_spec))
        .route("/certificates", post(certificates::certify))
        .route(
            "/certificates/verify",
            get(certificates::verify_by_hash).post(certificates::verify_by_file),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
