//! Test helpers: build AppState and router for integration tests.
//!
//! The app runs against the in-memory record store and local storage in temporary
//! directories, so no external services are needed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::Duration;
use clipvault_api::auth::JwtAuthenticator;
use clipvault_api::setup::{build_state, routes};
use clipvault_api::AppState;
use clipvault_core::{
    BaseConfig, Config, DatabaseConfig, StorageBackend, StorageConfig, UploadConfig, Video,
};
use clipvault_db::{InMemoryVideoStore, RecordStore};
use clipvault_storage::LocalStorage;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_JWT_ISSUER: &str = "clipvault-access";
pub const TEST_BASE_URL: &str = "http://localhost:4000/media";

/// Scaled-down video limit so oversize uploads stay cheap.
pub const TEST_MAX_VIDEO_BYTES: u64 = 1024 * 1024;

/// Test application: server, state, and owned temporary directories.
pub struct TestApp {
    pub server: TestServer,
    pub router: Router,
    pub state: Arc<AppState>,
    pub scratch_dir: TempDir,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Bearer token for `user_id`.
    pub fn token_for(&self, user_id: Uuid) -> String {
        JwtAuthenticator::new(TEST_JWT_SECRET, TEST_JWT_ISSUER)
            .issue(user_id, Duration::hours(1))
            .expect("Failed to issue test token")
    }

    /// Insert a video owned by `owner` and return it.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        self.state
            .records
            .create(&Video::new(owner, "Test video"))
            .await
            .expect("Failed to seed video")
    }

    pub async fn video(&self, id: Uuid) -> Video {
        self.state.records.get(id).await.expect("Video not found")
    }

    /// Number of scratch files left behind.
    pub fn scratch_file_count(&self) -> usize {
        count_files(self.scratch_dir.path())
    }

    /// Number of objects in local storage.
    pub fn stored_object_count(&self) -> usize {
        count_files(self.storage_dir.path())
    }

    /// Path of the stored object behind a public URL.
    pub fn object_path(&self, url: &str) -> PathBuf {
        let key = url
            .strip_prefix(&format!("{}/", TEST_BASE_URL))
            .expect("URL outside storage base URL");
        self.storage_dir.path().join(key)
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

pub fn test_config(scratch_dir: &Path, storage_dir: &Path) -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            environment: "test".to_string(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_issuer: TEST_JWT_ISSUER.to_string(),
            log_format: "text".to_string(),
            max_concurrent_uploads: 8,
            upload_timeout_secs: 60,
        },
        upload: UploadConfig {
            scratch_dir: scratch_dir.to_path_buf(),
            max_video_size_bytes: TEST_MAX_VIDEO_BYTES,
            ..UploadConfig::default()
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some(storage_dir.display().to_string()),
            local_storage_base_url: Some(TEST_BASE_URL.to_string()),
        },
        database: DatabaseConfig {
            database_url: None,
            max_connections: 1,
        },
    }
}

/// Setup test app with an in-memory record store and local storage.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Same as [`setup_test_app`], with `adjust` applied to the config first.
pub async fn setup_test_app_with(adjust: impl FnOnce(&mut Config)) -> TestApp {
    let scratch_dir = TempDir::new().expect("Failed to create scratch dir");
    let storage_dir = TempDir::new().expect("Failed to create storage dir");

    let mut config = test_config(scratch_dir.path(), storage_dir.path());
    adjust(&mut config);
    config.validate().expect("Test config should be valid");

    let records: Arc<dyn RecordStore> = Arc::new(InMemoryVideoStore::new());
    let storage = Arc::new(
        LocalStorage::new(storage_dir.path(), TEST_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage"),
    );

    let state = build_state(config, records, storage);
    let app = routes::setup_routes(&state.config, state.clone());
    let server =
        TestServer::new(app.clone().into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        router: app,
        state,
        scratch_dir,
        storage_dir,
    }
}

/// Single-part form carrying `data` under `field`.
pub fn file_form(field: &str, data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part(field.to_string(), part)
}

/// `len` bytes starting with the PNG signature.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len, 0xAB);
    data
}
