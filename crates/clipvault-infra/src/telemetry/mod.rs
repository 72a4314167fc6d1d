//! Tracing initialization
//!
//! Installs a `tracing_subscriber` registry with an `EnvFilter` and a text or JSON
//! formatting layer.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
