//! Seams between the engine and its collaborators.
//!
//! The provider and lock service are external per the system contract;
//! the vector store trait lets tests and alternative backends stand in
//! for the SQLite implementation.

use std::time::Duration;

use crate::errors::TextSearchResult;
use crate::types::{
    Document, DocumentId, DocumentType, SearchHit, SearchOptions, StorageId, StorageMeta,
    StorageSpec,
};

/// Embedding generation provider.
///
/// Must be side-effect free from the engine's perspective: the
/// double-check path may race and call it redundantly after a
/// lock-service restart.
pub trait IEmbeddingProvider: Send + Sync {
    /// Compute a fixed-length vector for the given content.
    fn embed(&self, content: &str, document_type: DocumentType) -> TextSearchResult<Vec<f32>>;

    /// Dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;

    /// Model name this provider serves.
    fn model(&self) -> &str;

    /// Whether the provider is currently usable.
    fn is_available(&self) -> bool;
}

impl std::fmt::Debug for dyn IEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IEmbeddingProvider")
            .field("model", &self.model())
            .finish()
    }
}

/// Held lock; releasing happens on drop, so the lock is released on
/// every exit path of the caller.
pub trait ILockGuard: Send {}

impl std::fmt::Debug for dyn ILockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ILockGuard")
    }
}

/// Named single-flight mutex service.
///
/// Pluggable: the engine ships an in-process implementation; cluster
/// deployments substitute a distributed one. Unrelated keys must never
/// block each other.
pub trait ILockService: Send + Sync {
    /// Acquire the lock for `key`, waiting at most `timeout`.
    /// Expiry returns `TextSearchError::LockTimeout`.
    fn acquire(&self, key: &str, timeout: Duration) -> TextSearchResult<Box<dyn ILockGuard>>;
}

/// Persistence for storages, embeddings, and documents.
///
/// `resolve_or_insert` and `delete_document` must be atomic with respect
/// to each other for a given `(storage, key)`; the engine relies on that
/// instead of reimplementing it.
pub trait IVectorStore: Send + Sync {
    /// Allocate a registry row and the storage's partition.
    /// Does not build the similarity index.
    fn create_storage(&self, spec: &StorageSpec) -> TextSearchResult<StorageId>;

    /// Fetch registry metadata. `None` for unknown ids.
    fn get_storage(&self, id: StorageId) -> TextSearchResult<Option<StorageMeta>>;

    /// Drop the partition (embeddings and index), the storage's
    /// documents, and the registry row, atomically.
    fn delete_storage(&self, id: StorageId) -> TextSearchResult<()>;

    /// Build the partition's similarity index. No-op when present.
    fn create_index(&self, id: StorageId) -> TextSearchResult<()>;

    /// Drop the partition's similarity index. No-op when absent.
    fn delete_index(&self, id: StorageId) -> TextSearchResult<()>;

    /// The atomic resolve-or-insert-document operation.
    ///
    /// With `vector = None`: resolution only — returns `None` without
    /// side effects when no embedding exists for `key`. With a vector:
    /// inserts the embedding (a concurrent duplicate resolves to the
    /// existing row instead of erroring), then inserts or reuses the
    /// document per the storage's uniqueness policy.
    fn resolve_or_insert(
        &self,
        storage: &StorageMeta,
        key: &str,
        vector: Option<&[f32]>,
    ) -> TextSearchResult<Option<DocumentId>>;

    /// Delete a document; garbage-collects its embedding when no other
    /// document references it.
    fn delete_document(&self, id: DocumentId) -> TextSearchResult<()>;

    /// Fetch a document row. `None` for unknown ids.
    fn get_document(&self, id: DocumentId) -> TextSearchResult<Option<Document>>;

    /// Stored vector of a document (for search by document reference).
    fn document_vector(&self, id: DocumentId) -> TextSearchResult<Vec<f32>>;

    /// Nearest neighbors of `reference` within the storage's partition,
    /// ordered ascending by cosine distance.
    fn search(
        &self,
        storage: &StorageMeta,
        reference: &[f32],
        options: &SearchOptions,
    ) -> TextSearchResult<Vec<SearchHit>>;
}
