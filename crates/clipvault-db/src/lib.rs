//! Clipvault record stores
//!
//! Persistence for the `Video` records that uploaded assets are linked to.

pub mod db;

pub use db::{InMemoryVideoStore, PgVideoRepository, RecordStore, RecordStoreError};
