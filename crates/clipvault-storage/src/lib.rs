//! Clipvault Storage Library
//!
//! This crate provides the object transfer abstraction and its implementations for
//! Clipvault: an S3 backend built on `object_store` and a local filesystem backend.
//!
//! # Storage key format
//!
//! Keys are derived by the [`keys`] module as `{scope}/{random}{ext}`, where `scope` is
//! the asset slot prefix (`thumbnails`, `videos`), `random` is 32 CSPRNG bytes encoded
//! as unpadded base64url and `ext` follows the media type. Keys must not contain `..`
//! or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipvault_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{derive_key, derive_key_with, extension_for};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectTransfer, StorageError, StorageResult};
