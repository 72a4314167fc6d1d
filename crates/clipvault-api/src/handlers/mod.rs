pub mod asset_upload;
pub mod health;
