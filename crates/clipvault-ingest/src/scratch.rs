//! Local scratch files for buffering upload bodies.
//!
//! A [`ScratchHandle`] owns exactly one temporary file. The file is removed when the
//! handle is released or dropped, so a cancelled request future cleans up too.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

const SCRATCH_PREFIX: &str = "clipvault-";

/// Scratch buffer errors
#[derive(Debug, thiserror::Error)]
pub enum ScratchError {
    #[error("Scratch IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Scratch file already released")]
    Released,
}

/// Hands out scratch files in one directory.
#[derive(Debug, Clone)]
pub struct ScratchBuffer {
    dir: PathBuf,
}

impl ScratchBuffer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a fresh, uniquely named scratch file.
    pub async fn acquire(&self) -> Result<ScratchHandle, ScratchError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let named = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempfile_in(&self.dir)?;
        let (std_file, path) = named.into_parts();

        tracing::debug!(path = %path.display(), "Acquired scratch file");

        Ok(ScratchHandle {
            file: Some(File::from_std(std_file)),
            path: Some(path),
            written: 0,
        })
    }
}

/// Exclusive handle to one scratch file.
#[derive(Debug)]
pub struct ScratchHandle {
    file: Option<File>,
    path: Option<TempPath>,
    written: u64,
}

impl ScratchHandle {
    fn file_mut(&mut self) -> Result<&mut File, ScratchError> {
        self.file.as_mut().ok_or(ScratchError::Released)
    }

    /// Copy `source` to EOF into the file, failing once more than `max_bytes` arrive.
    ///
    /// At most `max_bytes + 1` bytes are read from `source`. On `PayloadTooLarge`
    /// the partial contents stay on disk until release and must not be used.
    pub async fn write_from<R>(&mut self, source: &mut R, max_bytes: u64) -> Result<u64, ScratchError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let file = self.file_mut()?;
        let mut limited = source.take(max_bytes.saturating_add(1));

        let written = tokio::io::copy(&mut limited, file).await?;
        file.flush().await?;
        self.written = written;

        if written > max_bytes {
            return Err(ScratchError::PayloadTooLarge { limit: max_bytes });
        }
        Ok(written)
    }

    /// Seek back to the start so the contents can be read again.
    pub async fn rewind(&mut self) -> Result<(), ScratchError> {
        self.file_mut()?.seek(SeekFrom::Start(0)).await?;
        Ok(())
    }

    /// The file as a readable, seekable source.
    pub fn as_readable(&mut self) -> Result<&mut File, ScratchError> {
        self.file_mut()
    }

    /// Bytes accepted by the last `write_from`.
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close and remove the file. Safe to call any number of times.
    pub fn release(&mut self) {
        self.file.take();
        if let Some(path) = self.path.take() {
            let shown = path.display().to_string();
            match path.close() {
                Ok(()) => tracing::debug!(path = %shown, "Released scratch file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(error = %e, path = %shown, "Failed to remove scratch file")
                }
            }
        }
    }
}

impl Drop for ScratchHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn write_rewind_read() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchBuffer::new(dir.path());
        let mut handle = scratch.acquire().await.unwrap();

        let path = handle.path().unwrap().to_path_buf();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SCRATCH_PREFIX));

        let written = handle.write_from(&mut &b"hello scratch"[..], 64).await.unwrap();
        assert_eq!(written, 13);
        assert_eq!(handle.len(), 13);

        handle.rewind().await.unwrap();
        let mut out = Vec::new();
        handle.as_readable().unwrap().read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello scratch");

        handle.release();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn exact_limit_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ScratchBuffer::new(dir.path()).acquire().await.unwrap();
        let body = vec![1u8; 1024];
        assert_eq!(handle.write_from(&mut body.as_slice(), 1024).await.unwrap(), 1024);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ScratchBuffer::new(dir.path()).acquire().await.unwrap();
        let body = vec![0u8; 1536];

        let err = handle.write_from(&mut body.as_slice(), 1024).await.unwrap_err();
        assert!(matches!(err, ScratchError::PayloadTooLarge { limit: 1024 }));

        handle.release();
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ScratchBuffer::new(dir.path()).acquire().await.unwrap();

        handle.release();
        handle.release();
        assert_eq!(entries(dir.path()), 0);
        assert!(matches!(handle.rewind().await, Err(ScratchError::Released)));
    }

    #[tokio::test]
    async fn release_after_external_removal_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ScratchBuffer::new(dir.path()).acquire().await.unwrap();
        std::fs::remove_file(handle.path().unwrap()).unwrap();

        handle.release();
        assert!(handle.path().is_none());
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut handle = ScratchBuffer::new(dir.path()).acquire().await.unwrap();
            handle.write_from(&mut &b"abc"[..], 10).await.unwrap();
            assert_eq!(entries(dir.path()), 1);
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn failed_acquire_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let result = ScratchBuffer::new(&blocker).acquire().await;
        assert!(matches!(result, Err(ScratchError::Io(_))));
        assert_eq!(entries(dir.path()), 1);
    }
}
