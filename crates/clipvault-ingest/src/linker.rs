use std::sync::Arc;

use clipvault_core::{AssetLocator, AssetSlot, Video};
use clipvault_db::RecordStore;
use uuid::Uuid;

use crate::error::IngestError;

/// Records a stored asset on its owning video.
#[derive(Clone)]
pub struct AssetLinker {
    records: Arc<dyn RecordStore>,
}

impl AssetLinker {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Point `slot` of `video` at `locator` and persist it.
    ///
    /// Ownership is checked again here; a mismatch leaves `video` untouched. On a
    /// persist failure the returned error is final and the caller owns the cleanup
    /// of the stored object.
    pub async fn link(
        &self,
        mut video: Video,
        user_id: Uuid,
        slot: AssetSlot,
        locator: &AssetLocator,
    ) -> Result<Video, IngestError> {
        if !video.is_owned_by(user_id) {
            return Err(IngestError::NotOwner {
                video_id: video.id,
                user_id,
            });
        }

        let replaced = video.asset_url(slot).is_some();
        video.set_asset_url(slot, locator.url.clone());

        let updated = self
            .records
            .update(&video)
            .await
            .map_err(IngestError::Persist)?;

        tracing::info!(
            video_id = %updated.id,
            slot = %slot,
            key = %locator.key,
            replaced,
            "Linked asset to video"
        );

        Ok(updated)
    }
}
