//! Application setup and initialization
//!
//! Everything `main` needs to go from a validated [`Config`] to a router, kept out of
//! the binary so integration tests can build the same app.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clipvault_core::Config;
use clipvault_db::RecordStore;
use clipvault_ingest::{IngestionPipeline, ScratchBuffer, UploadPolicies};
use clipvault_storage::ObjectTransfer;

use crate::auth::JwtAuthenticator;
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    let records = database::setup_record_store(&config).await?;

    let storage = clipvault_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %storage.backend_type(), "Storage backend initialized");

    let state = build_state(config, records, storage);
    let router = routes::setup_routes(&state.config, state.clone());

    Ok((state, router))
}

/// Wire the pipeline and authenticator around already-built backends.
pub fn build_state(
    config: Config,
    records: Arc<dyn RecordStore>,
    storage: Arc<dyn ObjectTransfer>,
) -> Arc<AppState> {
    let scratch = ScratchBuffer::new(config.upload.scratch_dir.clone());
    let policies = UploadPolicies::from_config(&config.upload);
    let pipeline = IngestionPipeline::new(
        Arc::clone(&records),
        storage,
        scratch,
        policies,
    );
    let authenticator = Arc::new(JwtAuthenticator::new(
        config.jwt_secret(),
        config.jwt_issuer(),
    ));

    Arc::new(AppState {
        config,
        pipeline,
        records,
        authenticator,
    })
}
