use std::io;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use clipvault_core::{AppError, AssetSlot, Video};
use clipvault_ingest::UploadRequest;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/assets/{id}/thumbnail",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form with a `thumbnail` file part"),
    responses(
        (status = 200, description = "Thumbnail stored and linked", body = Video),
        (status = 400, description = "Invalid input, content type or size", body = ErrorResponse),
        (status = 401, description = "Missing credentials or not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    upload_asset(state, auth, id, AssetSlot::Thumbnail, multipart).await
}

#[utoipa::path(
    put,
    path = "/assets/{id}/video",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form with a `video` file part"),
    responses(
        (status = 200, description = "Video file stored and linked", body = Video),
        (status = 400, description = "Invalid input, content type or size", body = ErrorResponse),
        (status = 401, description = "Missing credentials or not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    upload_asset(state, auth, id, AssetSlot::Video, multipart).await
}

/// Stream the slot's form part through the ingestion pipeline.
///
/// Parts with other names are skipped; the body of the matching part is never
/// collected in memory.
async fn upload_asset(
    state: Arc<AppState>,
    auth: AuthContext,
    id: String,
    slot: AssetSlot,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::InvalidInput(format!("Invalid video ID: {}", id)))?;

    let mut multipart = multipart
        .map_err(|e| AppError::InvalidInput(format!("Expected a multipart form: {}", e)))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(slot.field_name()) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        tracing::debug!(
            video_id = %video_id,
            slot = %slot,
            content_type = %content_type,
            file_name = ?field.file_name(),
            "Receiving asset upload"
        );

        let body = StreamReader::new(Box::pin(field.map_err(io::Error::other)));
        let video = state
            .pipeline
            .run(UploadRequest {
                video_id,
                user_id: auth.user_id,
                slot,
                content_type,
                body,
            })
            .await?;

        return Ok(Json(video));
    }

    Err(AppError::InvalidInput(format!(
        "Missing form field '{}'",
        slot.field_name()
    ))
    .into())
}
