use crate::traits::{ObjectTransfer, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use clipvault_core::AssetLocator;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// Local filesystem storage implementation
///
/// Objects are written to a sibling temporary file and renamed into place, so a
/// reader never observes a partially written object.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/clipvault/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a storage key to a path under the base directory.
    ///
    /// Only plain relative components are accepted, so a key can never resolve
    /// outside `base_path`.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains('\\') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(self.base_path.join(relative))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl ObjectTransfer for LocalStorage {
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        key: &str,
        content_type: &str,
        _size_hint: Option<u64>,
    ) -> StorageResult<AssetLocator> {
        let path = self.key_to_path(key)?;
        let parent = path.parent().unwrap_or(&self.base_path).to_path_buf();
        fs::create_dir_all(&parent).await?;

        let start = std::time::Instant::now();

        let staging = tempfile::Builder::new()
            .prefix(".upload-")
            .tempfile_in(&parent)
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create staging file in {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        // Dropping `staging_path` before `persist` removes the partial file.
        let (std_file, staging_path) = staging.into_parts();
        let mut file = fs::File::from_std(std_file);

        let size = tokio::io::copy(reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        drop(file);

        staging_path.persist(&path).map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move upload into {}: {}",
                path.display(),
                e.error
            ))
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(AssetLocator {
            key: key.to_string(),
            url,
            size_bytes: size,
        })
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            )),
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage_in(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path().join("media"), "http://localhost:4000/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upload_then_download() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        let locator = storage
            .upload(&mut &b"png bytes"[..], "thumbnails/a.png", "image/png", Some(9))
            .await
            .unwrap();

        assert_eq!(locator.url, "http://localhost:4000/media/thumbnails/a.png");
        assert_eq!(locator.size_bytes, 9);
        assert_eq!(storage.download("thumbnails/a.png").await.unwrap(), b"png bytes");
        assert!(storage.exists("thumbnails/a.png").await.unwrap());
    }

    #[tokio::test]
    async fn upload_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        storage
            .upload(&mut &b"v"[..], "videos/b.mp4", "video/mp4", None)
            .await
            .unwrap();

        let mut entries = fs::read_dir(dir.path().join("media/videos")).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["b.mp4".to_string()]);
    }

    #[tokio::test]
    async fn rejects_keys_outside_base() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        for key in ["../escape.png", "/etc/passwd", "a/../../b", "", "a\\b"] {
            assert!(
                matches!(
                    storage.upload(&mut &b"x"[..], key, "image/png", None).await,
                    Err(StorageError::InvalidKey(_))
                ),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;

        storage.delete("videos/missing.mp4").await.unwrap();
        assert!(matches!(
            storage.download("videos/missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
