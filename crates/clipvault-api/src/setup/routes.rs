//! Route configuration and setup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use clipvault_core::Config;
use clipvault_infra::request_id_middleware;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api_doc::openapi_json;
use crate::auth::{auth_middleware, AuthState};
use crate::handlers::{asset_upload, health};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let auth_state = Arc::new(AuthState {
        authenticator: Arc::clone(&state.authenticator),
    });

    let max_concurrent_uploads = config.base.max_concurrent_uploads.max(1);
    tracing::info!(max_concurrent_uploads, "Upload concurrency limit enabled");

    // The pipeline enforces the per-slot size bound while streaming. One semaphore
    // is shared by both upload routes.
    let upload_routes = Router::new()
        .route("/assets/{id}/thumbnail", put(asset_upload::upload_thumbnail))
        .route("/assets/{id}/video", put(asset_upload::upload_video))
        .layer(DefaultBodyLimit::disable())
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_uploads))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi_json));

    let request_timeout_secs = config.base.upload_timeout_secs.max(1);
    tracing::info!(request_timeout_secs, "Request timeout layer enabled");

    public_routes
        .merge(upload_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
