//! Object transfer abstraction
//!
//! This module defines the ObjectTransfer trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use clipvault_core::AssetLocator;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Moves asset bytes into durable storage.
///
/// The pipeline only ever talks to this trait, so the S3 and local backends are
/// interchangeable. Keys come from [`crate::keys`].
#[async_trait]
pub trait ObjectTransfer: Send + Sync {
    /// Stream `reader` to EOF into the store under `key`.
    ///
    /// The stored object carries `content_type`. Either the whole object becomes
    /// visible under `key` or nothing does: a failed transfer leaves no partial object.
    /// `size_hint` is informational (logging) and never trusted as a bound.
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        key: &str,
        content_type: &str,
        size_hint: Option<u64>,
    ) -> StorageResult<AssetLocator>;

    /// Download an object by its key
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by its key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public address of `key`, computed without a round-trip to the store.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
