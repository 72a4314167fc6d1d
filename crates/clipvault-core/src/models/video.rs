use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::asset::AssetSlot;

/// Metadata record that uploaded assets are attached to.
///
/// Only `user_id` may change the asset URL fields; see `clipvault-ingest`'s linker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: None,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// URL currently stored in the given slot.
    pub fn asset_url(&self, slot: AssetSlot) -> Option<&str> {
        match slot {
            AssetSlot::Thumbnail => self.thumbnail_url.as_deref(),
            AssetSlot::Video => self.video_url.as_deref(),
        }
    }

    /// Point `slot` at `url` and bump the modification timestamp.
    pub fn set_asset_url(&mut self, slot: AssetSlot, url: String) {
        match slot {
            AssetSlot::Thumbnail => self.thumbnail_url = Some(url),
            AssetSlot::Video => self.video_url = Some(url),
        }
        self.updated_at = Utc::now();
    }
}
