//! Upload ingestion pipeline
//!
//! One invocation moves through `Received → Validated → Buffered → Uploaded → Linked →
//! Done`, or to `Aborted` on the first failure. Steps run strictly in order. The
//! scratch file is released on every path, and a video never references an object
//! whose link step failed.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use clipvault_core::{validate_content_type, Video};
use clipvault_db::{RecordStore, RecordStoreError};
use clipvault_storage::{derive_key, ObjectTransfer};
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::error::IngestError;
use crate::linker::AssetLinker;
use crate::scratch::ScratchBuffer;
use crate::types::{UploadPolicies, UploadRequest};

/// Pipeline stage, logged as the `stage` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Validated,
    Buffered,
    Uploaded,
    Linked,
    Done,
    Aborted,
}

impl Display for IngestStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            IngestStage::Received => "received",
            IngestStage::Validated => "validated",
            IngestStage::Buffered => "buffered",
            IngestStage::Uploaded => "uploaded",
            IngestStage::Linked => "linked",
            IngestStage::Done => "done",
            IngestStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct IngestionPipeline {
    records: Arc<dyn RecordStore>,
    storage: Arc<dyn ObjectTransfer>,
    scratch: ScratchBuffer,
    linker: AssetLinker,
    policies: UploadPolicies,
}

impl IngestionPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        storage: Arc<dyn ObjectTransfer>,
        scratch: ScratchBuffer,
        policies: UploadPolicies,
    ) -> Self {
        Self {
            linker: AssetLinker::new(Arc::clone(&records)),
            records,
            storage,
            scratch,
            policies,
        }
    }

    /// Ingest one upload and return the updated video.
    pub async fn run<R>(&self, request: UploadRequest<R>) -> Result<Video, IngestError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let video_id = request.video_id;
        let slot = request.slot;
        let mut stage = IngestStage::Received;

        tracing::debug!(video_id = %video_id, slot = %slot, stage = %stage, "Upload received");

        match self.drive(request, &mut stage).await {
            Ok(video) => {
                tracing::info!(
                    video_id = %video_id,
                    slot = %slot,
                    stage = %IngestStage::Done,
                    "Upload ingested"
                );
                Ok(video)
            }
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!(
                        error = %e,
                        video_id = %video_id,
                        slot = %slot,
                        failed_after = %stage,
                        stage = %IngestStage::Aborted,
                        "Upload rejected"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        video_id = %video_id,
                        slot = %slot,
                        failed_after = %stage,
                        stage = %IngestStage::Aborted,
                        "Upload failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn drive<R>(
        &self,
        mut request: UploadRequest<R>,
        stage: &mut IngestStage,
    ) -> Result<Video, IngestError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let slot = request.slot;
        let policy = self.policies.for_slot(slot);

        let video = self
            .records
            .get(request.video_id)
            .await
            .map_err(|e| match e {
                RecordStoreError::NotFound(id) => IngestError::NotFound(id),
                other => IngestError::Persist(other),
            })?;
        self.ensure_owner(&video, request.user_id)?;
        let media_type = validate_content_type(&request.content_type, &policy.allowed_content_types)?;
        self.advance(stage, IngestStage::Validated, video.id);

        let mut scratch = self.scratch.acquire().await?;
        let size = scratch.write_from(&mut request.body, policy.max_bytes).await?;
        scratch.rewind().await?;
        self.advance(stage, IngestStage::Buffered, video.id);

        let key = derive_key(&media_type, slot.key_prefix());
        let locator = self
            .storage
            .upload(scratch.as_readable()?, &key, &media_type, Some(size))
            .await?;
        scratch.release();
        self.advance(stage, IngestStage::Uploaded, video.id);

        let updated = match self
            .linker
            .link(video, request.user_id, slot, &locator)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_orphan(&locator.key).await;
                return Err(e);
            }
        };
        self.advance(stage, IngestStage::Linked, updated.id);

        Ok(updated)
    }

    fn ensure_owner(&self, video: &Video, user_id: Uuid) -> Result<(), IngestError> {
        if video.is_owned_by(user_id) {
            Ok(())
        } else {
            Err(IngestError::NotOwner {
                video_id: video.id,
                user_id,
            })
        }
    }

    fn advance(&self, stage: &mut IngestStage, next: IngestStage, video_id: Uuid) {
        *stage = next;
        tracing::debug!(video_id = %video_id, stage = %next, "Upload stage reached");
    }

    /// Best-effort removal of an object that will never be referenced.
    async fn discard_orphan(&self, key: &str) {
        match self.storage.delete(key).await {
            Ok(()) => tracing::info!(key = %key, "Removed unlinked object"),
            Err(e) => tracing::warn!(
                error = %e,
                key = %key,
                "Failed to remove unlinked object; it is now orphaned"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlotPolicy;
    use async_trait::async_trait;
    use clipvault_core::AssetSlot;
    use clipvault_db::InMemoryVideoStore;
    use clipvault_storage::LocalStorage;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    /// Delegates reads to an in-memory store and fails every update.
    struct FailingUpdates {
        inner: InMemoryVideoStore,
    }

    #[async_trait]
    impl RecordStore for FailingUpdates {
        async fn get(&self, id: Uuid) -> Result<Video, RecordStoreError> {
            self.inner.get(id).await
        }

        async fn update(&self, _video: &Video) -> Result<Video, RecordStoreError> {
            Err(RecordStoreError::Persist("connection refused".to_string()))
        }

        async fn create(&self, video: &Video) -> Result<Video, RecordStoreError> {
            self.inner.create(video).await
        }
    }

    struct Fixture {
        _dirs: TempDir,
        scratch_dir: std::path::PathBuf,
        media_dir: std::path::PathBuf,
        records: Arc<dyn RecordStore>,
        pipeline: IngestionPipeline,
        owner: Uuid,
        video: Video,
    }

    fn small_policies() -> UploadPolicies {
        UploadPolicies {
            thumbnail: SlotPolicy {
                max_bytes: 4 * 1024 * 1024,
                allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            },
            video: SlotPolicy {
                max_bytes: 1024,
                allowed_content_types: vec!["video/mp4".to_string()],
            },
        }
    }

    async fn fixture_with(records: Arc<dyn RecordStore>) -> Fixture {
        let dirs = tempfile::tempdir().unwrap();
        let scratch_dir = dirs.path().join("scratch");
        let media_dir = dirs.path().join("media");
        let storage = LocalStorage::new(&media_dir, "http://localhost:4000/media".to_string())
            .await
            .unwrap();

        let owner = Uuid::new_v4();
        let video = Video::new(owner, "launch");
        records.create(&video).await.unwrap();

        let pipeline = IngestionPipeline::new(
            Arc::clone(&records),
            Arc::new(storage),
            ScratchBuffer::new(&scratch_dir),
            small_policies(),
        );

        Fixture {
            _dirs: dirs,
            scratch_dir,
            media_dir,
            records,
            pipeline,
            owner,
            video,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(Arc::new(InMemoryVideoStore::new())).await
    }

    fn count_files(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        entries
            .flatten()
            .map(|e| {
                let path = e.path();
                if path.is_dir() {
                    count_files(&path)
                } else {
                    1
                }
            })
            .sum()
    }

    fn request(
        fx: &Fixture,
        user_id: Uuid,
        slot: AssetSlot,
        content_type: &str,
        body: &[u8],
    ) -> UploadRequest<std::io::Cursor<Vec<u8>>> {
        UploadRequest {
            video_id: fx.video.id,
            user_id,
            slot,
            content_type: content_type.to_string(),
            body: std::io::Cursor::new(body.to_vec()),
        }
    }

    #[tokio::test]
    async fn owner_thumbnail_upload_is_linked() {
        let fx = fixture().await;
        let body = vec![0x89u8; 2 * 1024 * 1024];

        let updated = fx
            .pipeline
            .run(request(&fx, fx.owner, AssetSlot::Thumbnail, "image/png", &body))
            .await
            .unwrap();

        let url = updated.thumbnail_url.clone().unwrap();
        assert!(url.starts_with("http://localhost:4000/media/thumbnails/"));
        assert!(url.ends_with(".png"));
        assert!(updated.updated_at >= fx.video.updated_at);
        assert_eq!(fx.records.get(fx.video.id).await.unwrap(), updated);

        let key = url.trim_start_matches("http://localhost:4000/media/");
        assert_eq!(std::fs::read(fx.media_dir.join(key)).unwrap(), body);
        assert_eq!(count_files(&fx.scratch_dir), 0);
    }

    #[tokio::test]
    async fn non_owner_is_rejected_and_nothing_changes() {
        let fx = fixture().await;

        let result = fx
            .pipeline
            .run(request(&fx, Uuid::new_v4(), AssetSlot::Thumbnail, "image/png", b"png"))
            .await;

        assert!(matches!(result, Err(IngestError::NotOwner { .. })));
        assert_eq!(fx.records.get(fx.video.id).await.unwrap(), fx.video);
        assert_eq!(count_files(&fx.media_dir), 0);
        assert_eq!(count_files(&fx.scratch_dir), 0);
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_before_buffering() {
        let fx = fixture().await;

        let result = fx
            .pipeline
            .run(request(&fx, fx.owner, AssetSlot::Thumbnail, "application/pdf", b"%PDF"))
            .await;

        assert!(matches!(result, Err(IngestError::UnsupportedMediaType { .. })));
        assert!(!fx.scratch_dir.exists());
        assert_eq!(count_files(&fx.media_dir), 0);
    }

    #[tokio::test]
    async fn malformed_content_type_is_invalid() {
        let fx = fixture().await;

        let result = fx
            .pipeline
            .run(request(&fx, fx.owner, AssetSlot::Video, "mp4", b"data"))
            .await;

        assert!(matches!(result, Err(IngestError::InvalidContentType(_))));
    }

    #[tokio::test]
    async fn oversized_video_is_rejected_and_scratch_removed() {
        let fx = fixture().await;
        let body = vec![0u8; 1536];

        let result = fx
            .pipeline
            .run(request(&fx, fx.owner, AssetSlot::Video, "video/mp4", &body))
            .await;

        assert!(matches!(result, Err(IngestError::PayloadTooLarge { limit: 1024 })));
        assert_eq!(count_files(&fx.scratch_dir), 0);
        assert_eq!(count_files(&fx.media_dir), 0);
        assert_eq!(fx.records.get(fx.video.id).await.unwrap().video_url, None);
    }

    #[tokio::test]
    async fn missing_video_is_not_found() {
        let fx = fixture().await;
        let mut req = request(&fx, fx.owner, AssetSlot::Video, "video/mp4", b"data");
        req.video_id = Uuid::new_v4();

        let result = fx.pipeline.run(req).await;
        assert!(matches!(result, Err(IngestError::NotFound(_))));
    }

    #[tokio::test]
    async fn link_failure_removes_uploaded_object() {
        let fx = fixture_with(Arc::new(FailingUpdates {
            inner: InMemoryVideoStore::new(),
        }))
        .await;

        let result = fx
            .pipeline
            .run(request(&fx, fx.owner, AssetSlot::Video, "video/mp4", b"mp4 bytes"))
            .await;

        assert!(matches!(result, Err(IngestError::Persist(_))));
        assert_eq!(count_files(&fx.media_dir), 0);
        assert_eq!(count_files(&fx.scratch_dir), 0);
    }

    #[tokio::test]
    async fn cancelled_upload_removes_scratch_file() {
        let fx = fixture().await;
        let (mut client, body) = tokio::io::duplex(64);
        client.write_all(b"first chunk of png").await.unwrap();

        let req = UploadRequest {
            video_id: fx.video.id,
            user_id: fx.owner,
            slot: AssetSlot::Thumbnail,
            content_type: "image/png".to_string(),
            body,
        };

        // The client never finishes the body, so the run stalls while buffering.
        let result =
            tokio::time::timeout(Duration::from_millis(300), fx.pipeline.run(req)).await;

        assert!(result.is_err());
        assert_eq!(count_files(&fx.scratch_dir), 0);
        assert_eq!(count_files(&fx.media_dir), 0);
        assert!(fx.records.get(fx.video.id).await.unwrap().thumbnail_url.is_none());
        drop(client);
    }
}
