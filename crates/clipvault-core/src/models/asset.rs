use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Which URL field of a [`Video`](super::Video) an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetSlot {
    Thumbnail,
    Video,
}

impl AssetSlot {
    /// Multipart form field carrying the file for this slot.
    pub fn field_name(&self) -> &'static str {
        match self {
            AssetSlot::Thumbnail => "thumbnail",
            AssetSlot::Video => "video",
        }
    }

    /// Key prefix used in the object store.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            AssetSlot::Thumbnail => "thumbnails",
            AssetSlot::Video => "videos",
        }
    }
}

impl Display for AssetSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.field_name())
    }
}

/// Durable reference to an object produced by a completed transfer.
///
/// `url` is derived from the backend settings and the key; resolving it needs no
/// extra round-trip to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssetLocator {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
}
