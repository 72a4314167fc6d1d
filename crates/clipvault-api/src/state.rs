use std::sync::Arc;

use clipvault_core::Config;
use clipvault_db::RecordStore;
use clipvault_ingest::IngestionPipeline;

use crate::auth::Authenticator;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: IngestionPipeline,
    pub records: Arc<dyn RecordStore>,
    pub authenticator: Arc<dyn Authenticator>,
}
