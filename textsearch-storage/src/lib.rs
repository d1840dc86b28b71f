//! # textsearch-storage
//!
//! SQLite persistence for the textsearch workspace: the storage registry,
//! per-storage embedding partitions, document rows, and the brute-force
//! cosine similarity scan.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::VectorStore;

use textsearch_core::TextSearchError;

/// Map a low-level storage failure message into the shared error type.
pub fn to_persistence_err(message: impl Into<String>) -> TextSearchError {
    TextSearchError::PersistenceFailure {
        message: message.into(),
    }
}
