//! Clipvault Infrastructure Library
//!
//! Shared plumbing for the Clipvault service: request ID middleware and tracing
//! initialization.

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
