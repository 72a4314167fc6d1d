use async_trait::async_trait;
use clipvault_core::Video;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::{RecordStore, RecordStoreError};

/// Postgres-backed video repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Video, RecordStoreError> {
        let row: Option<Video> =
            sqlx::query_as::<Postgres, Video>("SELECT * FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or(RecordStoreError::NotFound(id))
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update(&self, video: &Video) -> Result<Video, RecordStoreError> {
        let row: Option<Video> = sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RecordStoreError::NotFound(video.id))
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create(&self, video: &Video) -> Result<Video, RecordStoreError> {
        let row: Video = sqlx::query_as::<Postgres, Video>(
            r#"
            INSERT INTO videos (
                id, user_id, title, description,
                thumbnail_url, video_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
