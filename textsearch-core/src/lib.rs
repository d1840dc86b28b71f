//! # textsearch-core
//!
//! Foundation crate for the textsearch workspace.
//! Defines the shared types, traits, errors, and config.
//! The storage and engine crates both depend on this.

pub mod config;
pub mod errors;
pub mod traits;
pub mod types;

// Re-export the most commonly used items at the crate root.
pub use config::EngineConfig;
pub use errors::{TextSearchError, TextSearchResult};
pub use types::{
    Document, DocumentId, DocumentType, EmbeddingId, SearchHit, SearchOptions, SearchReference,
    StorageId, StorageMeta, StorageOptions, StorageSpec,
};
