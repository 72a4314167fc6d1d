//! Clipvault Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by every Clipvault component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, DatabaseConfig, StorageConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AssetLocator, AssetSlot, Video};
pub use storage_types::StorageBackend;
pub use validation::{validate_content_type, ContentTypeError};
