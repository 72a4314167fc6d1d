use crate::traits::{ObjectTransfer, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use clipvault_core::AssetLocator;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, Result as ObjectResult,
};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO, "https://nyc3.digitaloceanspaces.com" for DigitalOcean Spaces)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an already-built object store. Public URLs are still derived from
    /// `bucket`, `region` and `endpoint_url`.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        }
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style addressing on the endpoint
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl ObjectTransfer for S3Storage {
    async fn upload(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        key: &str,
        content_type: &str,
        size_hint: Option<u64>,
    ) -> StorageResult<AssetLocator> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );

        // Small bodies become a single PUT, large ones a multipart upload.
        let mut writer =
            BufWriter::new(Arc::clone(&self.store), location).with_attributes(attributes);

        let copied = match tokio::io::copy(reader, &mut writer).await {
            Ok(n) => writer.shutdown().await.map(|_| n),
            Err(e) => Err(e),
        };

        let size = match copied {
            Ok(n) => n,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %key,
                        "Failed to abort S3 upload"
                    );
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_hint = ?size_hint,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        let url = self.generate_url(key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(AssetLocator {
            key: key.to_string(),
            url,
            size_bytes: size,
        })
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
