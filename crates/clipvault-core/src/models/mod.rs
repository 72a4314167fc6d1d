pub mod asset;
pub mod video;

pub use asset::{AssetLocator, AssetSlot};
pub use video::Video;
