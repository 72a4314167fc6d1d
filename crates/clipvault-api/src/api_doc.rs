//! OpenAPI documentation.

use axum::Json;
use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clipvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipvault API",
        description = "Attach thumbnails and video files to video records"
    ),
    paths(
        handlers::asset_upload::upload_thumbnail,
        handlers::asset_upload::upload_video,
        handlers::health::health,
    ),
    components(
        schemas(
            models::Video,
            models::AssetSlot,
            handlers::health::HealthResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "assets", description = "Thumbnail and video file uploads, bearer token required"),
        (name = "health", description = "Liveness check")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
