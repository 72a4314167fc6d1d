//! Clipvault API Library
//!
//! This crate provides the HTTP surface of Clipvault: authentication, the asset upload
//! handlers and application setup.

mod api_doc;
mod handlers;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
