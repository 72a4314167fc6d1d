//! Configuration module
//!
//! Configuration is read from the environment (and an optional `.env` file) once at
//! startup, then validated before any service is built.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::AssetSlot;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const MAX_THUMBNAIL_SIZE_MB: u64 = 10;
const MAX_VIDEO_SIZE_MB: u64 = 1024;
const MAX_CONCURRENT_UPLOADS: usize = 32;
const UPLOAD_TIMEOUT_SECS: u64 = 3600;
const DEFAULT_JWT_ISSUER: &str = "clipvault-access";
const DEFAULT_THUMBNAIL_CONTENT_TYPES: &str = "image/jpeg,image/png";
const DEFAULT_VIDEO_CONTENT_TYPES: &str = "video/mp4";

/// Server-wide settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub log_format: String,
    pub max_concurrent_uploads: usize,
    pub upload_timeout_secs: u64,
}

/// Per-slot upload limits and the scratch directory used to buffer bodies.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub scratch_dir: PathBuf,
    pub max_thumbnail_size_bytes: u64,
    pub max_video_size_bytes: u64,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
}

impl UploadConfig {
    pub fn max_size_for(&self, slot: AssetSlot) -> u64 {
        match slot {
            AssetSlot::Thumbnail => self.max_thumbnail_size_bytes,
            AssetSlot::Video => self.max_video_size_bytes,
        }
    }

    pub fn allowed_content_types_for(&self, slot: AssetSlot) -> &[String] {
        match slot {
            AssetSlot::Thumbnail => &self.thumbnail_allowed_content_types,
            AssetSlot::Video => &self.video_allowed_content_types,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            scratch_dir: env::temp_dir(),
            max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_MB * 1024 * 1024,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            thumbnail_allowed_content_types: parse_list(DEFAULT_THUMBNAIL_CONTENT_TYPES),
            video_allowed_content_types: parse_list(DEFAULT_VIDEO_CONTENT_TYPES),
        }
    }
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, DigitalOcean Spaces, ...)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Record store settings. Without a database URL the in-memory store is used.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> Result<T, anyhow::Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", name, value)),
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    parse_or(name, env::var(name).ok().as_deref(), default)
}

fn megabytes(name: &str, mb: u64) -> Result<u64, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MB", name, mb))
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            max_concurrent_uploads: env_or("MAX_CONCURRENT_UPLOADS", MAX_CONCURRENT_UPLOADS)?,
            upload_timeout_secs: env_or("UPLOAD_TIMEOUT_SECS", UPLOAD_TIMEOUT_SECS)?,
        };

        let upload = UploadConfig {
            scratch_dir: env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            max_thumbnail_size_bytes: megabytes(
                "MAX_THUMBNAIL_SIZE_MB",
                env_or("MAX_THUMBNAIL_SIZE_MB", MAX_THUMBNAIL_SIZE_MB)?,
            )?,
            max_video_size_bytes: megabytes(
                "MAX_VIDEO_SIZE_MB",
                env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?,
            )?,
            thumbnail_allowed_content_types: parse_list(
                &env::var("THUMBNAIL_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_THUMBNAIL_CONTENT_TYPES.to_string()),
            ),
            video_allowed_content_types: parse_list(
                &env::var("VIDEO_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_VIDEO_CONTENT_TYPES.to_string()),
            ),
        };

        let storage = StorageConfig {
            backend: match env::var("STORAGE_BACKEND") {
                Ok(raw) => raw.parse()?,
                Err(_) => StorageBackend::S3,
            },
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
        };

        let database = DatabaseConfig {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
        };

        let config = Config {
            base,
            upload,
            storage,
            database,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if let Some(ref url) = self.database.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.upload.max_thumbnail_size_bytes == 0 || self.upload.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        if self.upload.thumbnail_allowed_content_types.is_empty()
            || self.upload.video_allowed_content_types.is_empty()
        {
            return Err(anyhow::anyhow!(
                "Allowed content type lists must not be empty"
            ));
        }

        if self.base.max_concurrent_uploads == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_UPLOADS must be at least 1"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none()
                    || self.storage.local_storage_base_url.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.base.jwt_issuer
    }

    /// Explicit S3 region, falling back to the AWS SDK's region variable.
    pub fn s3_region(&self) -> Option<&str> {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.database_url.as_deref()
    }
}
