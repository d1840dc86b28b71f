//! Error taxonomy shared across the workspace.
//!
//! All failures propagate to the immediate caller; nothing is retried
//! internally. The engine releases its single-flight lock on every exit
//! path regardless of which variant is returned.

/// Result alias used throughout the workspace.
pub type TextSearchResult<T> = Result<T, TextSearchError>;

/// Errors produced by the registry, the dedup engine, and the vector store.
#[derive(Debug, thiserror::Error)]
pub enum TextSearchError {
    /// An unknown storage or document id was referenced.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The embedding provider failed to compute a vector.
    #[error("embedding provider '{model}' failed: {reason}")]
    ProviderFailure { model: String, reason: String },

    /// A store operation failed (SQLite error, corrupt row, ...).
    #[error("persistence failure: {message}")]
    PersistenceFailure { message: String },

    /// Mismatched dimensions, unregistered model, or similar misuse.
    #[error("configuration error: {message}")]
    ConfigurationError { message: String },

    /// Bounded wait on a single-flight lock expired.
    #[error("timed out waiting for lock '{key}' after {waited_ms} ms")]
    LockTimeout { key: String, waited_ms: u64 },
}

impl TextSearchError {
    /// Shorthand for an unknown-storage error.
    pub fn storage_not_found(id: i64) -> Self {
        Self::NotFound { entity: "storage", id }
    }

    /// Shorthand for an unknown-document error.
    pub fn document_not_found(id: i64) -> Self {
        Self::NotFound { entity: "document", id }
    }
}
