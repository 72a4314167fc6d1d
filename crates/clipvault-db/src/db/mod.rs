//! Record store repositories
//!
//! [`RecordStore`] is the seam the ingestion pipeline persists through. The Postgres
//! repository backs production; the in-memory store is used when no database is
//! configured and in tests.

pub mod memory;
pub mod video;

use async_trait::async_trait;
use clipvault_core::Video;
use uuid::Uuid;

pub use memory::InMemoryVideoStore;
pub use video::PgVideoRepository;

/// Record store errors
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Persist failed: {0}")]
    Persist(String),
}

/// Trait for video record operations
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Video, RecordStoreError>;

    /// Persist every mutable field of `video` and return the stored record.
    async fn update(&self, video: &Video) -> Result<Video, RecordStoreError>;

    /// Insert a new record.
    async fn create(&self, video: &Video) -> Result<Video, RecordStoreError>;
}
