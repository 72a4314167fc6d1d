//! Database setup and initialization

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clipvault_core::Config;
use clipvault_db::{InMemoryVideoStore, PgVideoRepository, RecordStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Setup database connection pool and run migrations
pub async fn setup_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections, "Database connected successfully");

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Postgres-backed record store when `DATABASE_URL` is set, in-memory otherwise.
pub async fn setup_record_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    match config.database_url() {
        Some(url) => {
            let pool = setup_database(url, config.database.max_connections).await?;
            Ok(Arc::new(PgVideoRepository::new(pool)))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, using in-memory record store (data is lost on restart)"
            );
            Ok(Arc::new(InMemoryVideoStore::new()))
        }
    }
}
