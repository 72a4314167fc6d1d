//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Anything convertible into `AppError`
//! becomes an `HttpAppError` and renders with the same status, body and logging.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clipvault_core::{AppError, ErrorMetadata, LogLevel};
use clipvault_ingest::IngestError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both IntoResponse and AppError are foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid multipart body: {}",
            err.body_text()
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn body(&self, include_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        ErrorResponse {
            error: app_error.client_message(),
            details: include_details.then(|| app_error.detailed_message()),
            error_type: include_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        // Details never leave the process in production or for sensitive errors.
        let include_details = !is_production_env() && !self.0.is_sensitive();

        (status, Json(self.body(include_details))).into_response()
    }
}
