use clipvault_core::{AppError, ContentTypeError};
use clipvault_db::RecordStoreError;
use clipvault_storage::StorageError;
use uuid::Uuid;

use crate::scratch::ScratchError;

/// Ingestion failures, one variant per pipeline failure class.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("User {user_id} does not own video {video_id}")]
    NotOwner { video_id: Uuid, user_id: Uuid },

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Unsupported media type {content_type}")]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Scratch IO failed: {0}")]
    Io(#[source] std::io::Error),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] StorageError),

    #[error("Persist failed: {0}")]
    Persist(#[source] RecordStoreError),
}

impl IngestError {
    /// Failures caused by the request rather than by a backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::NotFound(_)
                | IngestError::NotOwner { .. }
                | IngestError::InvalidContentType(_)
                | IngestError::UnsupportedMediaType { .. }
                | IngestError::PayloadTooLarge { .. }
        )
    }
}

impl From<ScratchError> for IngestError {
    fn from(err: ScratchError) -> Self {
        match err {
            ScratchError::PayloadTooLarge { limit } => IngestError::PayloadTooLarge { limit },
            ScratchError::Io(e) => IngestError::Io(e),
            ScratchError::Released => {
                IngestError::Io(std::io::Error::other("scratch file already released"))
            }
        }
    }
}

impl From<ContentTypeError> for IngestError {
    fn from(err: ContentTypeError) -> Self {
        match err {
            ContentTypeError::Invalid(declared) => IngestError::InvalidContentType(declared),
            ContentTypeError::Unsupported {
                content_type,
                allowed,
            } => IngestError::UnsupportedMediaType {
                content_type,
                allowed,
            },
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            IngestError::NotOwner { .. } => {
                AppError::NotOwner("You do not own this video".to_string())
            }
            IngestError::InvalidContentType(declared) => {
                AppError::InvalidInput(format!("Invalid Content-Type: {:?}", declared))
            }
            IngestError::UnsupportedMediaType {
                content_type,
                allowed,
            } => AppError::UnsupportedMediaType(format!(
                "{} is not allowed (allowed: {})",
                content_type,
                allowed.join(", ")
            )),
            IngestError::PayloadTooLarge { limit } => AppError::PayloadTooLarge(format!(
                "Upload exceeds the maximum size of {} bytes",
                limit
            )),
            IngestError::Io(e) => AppError::Io(e.to_string()),
            IngestError::Transfer(e) => AppError::Storage(e.to_string()),
            IngestError::Persist(e) => AppError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipvault_core::ErrorMetadata;

    #[test]
    fn maps_to_http_taxonomy() {
        let cases: Vec<(IngestError, u16)> = vec![
            (IngestError::NotFound(Uuid::nil()), 404),
            (
                IngestError::NotOwner {
                    video_id: Uuid::nil(),
                    user_id: Uuid::nil(),
                },
                401,
            ),
            (IngestError::InvalidContentType("??".to_string()), 400),
            (
                IngestError::UnsupportedMediaType {
                    content_type: "application/pdf".to_string(),
                    allowed: vec!["image/png".to_string()],
                },
                400,
            ),
            (IngestError::PayloadTooLarge { limit: 10 }, 400),
            (IngestError::Io(std::io::Error::other("disk")), 500),
            (
                IngestError::Transfer(StorageError::UploadFailed("reset".to_string())),
                500,
            ),
            (
                IngestError::Persist(RecordStoreError::Persist("down".to_string())),
                500,
            ),
        ];

        for (err, status) in cases {
            let client = err.is_client_error();
            let app: AppError = err.into();
            assert_eq!(app.http_status_code(), status, "{}", app);
            assert_eq!(client, status < 500);
        }
    }

    #[test]
    fn scratch_limit_becomes_payload_too_large() {
        let err: IngestError = ScratchError::PayloadTooLarge { limit: 42 }.into();
        assert!(matches!(err, IngestError::PayloadTooLarge { limit: 42 }));
    }
}
