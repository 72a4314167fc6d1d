use clipvault_core::{AssetSlot, UploadConfig};
use uuid::Uuid;

/// One upload as handed over by the transport.
pub struct UploadRequest<R> {
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub slot: AssetSlot,
    /// Media type as declared by the client.
    pub content_type: String,
    /// Upload body; read once, never seeked.
    pub body: R,
}

/// Limits applied to one asset slot.
#[derive(Debug, Clone)]
pub struct SlotPolicy {
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UploadPolicies {
    pub thumbnail: SlotPolicy,
    pub video: SlotPolicy,
}

impl UploadPolicies {
    pub fn from_config(config: &UploadConfig) -> Self {
        let policy = |slot| SlotPolicy {
            max_bytes: config.max_size_for(slot),
            allowed_content_types: config.allowed_content_types_for(slot).to_vec(),
        };
        Self {
            thumbnail: policy(AssetSlot::Thumbnail),
            video: policy(AssetSlot::Video),
        }
    }

    pub fn for_slot(&self, slot: AssetSlot) -> &SlotPolicy {
        match slot {
            AssetSlot::Thumbnail => &self.thumbnail,
            AssetSlot::Video => &self.video,
        }
    }
}

impl Default for UploadPolicies {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}
