use clipvault_api::setup;
use clipvault_core::Config;
use clipvault_infra::LogFormat;

// mimalloc as the global allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    let log_format = config
        .base
        .log_format
        .parse::<LogFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;
    clipvault_infra::init_telemetry("clipvault-api", config.environment(), log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Initialize the application (record store, storage, pipeline, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
