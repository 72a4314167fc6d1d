//! Clipvault ingestion pipeline
//!
//! Takes one streamed upload from the HTTP layer to a linked asset:
//! validate → buffer → upload → link. See [`IngestionPipeline`].

pub mod error;
pub mod linker;
pub mod pipeline;
pub mod scratch;
pub mod types;

pub use error::IngestError;
pub use linker::AssetLinker;
pub use pipeline::{IngestStage, IngestionPipeline};
pub use scratch::{ScratchBuffer, ScratchError, ScratchHandle};
pub use types::{SlotPolicy, UploadPolicies, UploadRequest};
