use std::collections::HashMap;

use async_trait::async_trait;
use clipvault_core::Video;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, RecordStoreError};

/// Process-local record store.
///
/// Used when `DATABASE_URL` is unset. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: RwLock<HashMap<Uuid, Video>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryVideoStore {
    async fn get(&self, id: Uuid) -> Result<Video, RecordStoreError> {
        self.videos
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RecordStoreError::NotFound(id))
    }

    async fn update(&self, video: &Video) -> Result<Video, RecordStoreError> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(stored) => {
                *stored = video.clone();
                Ok(stored.clone())
            }
            None => Err(RecordStoreError::NotFound(video.id)),
        }
    }

    async fn create(&self, video: &Video) -> Result<Video, RecordStoreError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(RecordStoreError::Persist(format!(
                "video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video.clone())
    }
}
