//! VectorStore — owns the ConnectionPool, implements IVectorStore,
//! runs migrations on open.

use std::path::Path;

use textsearch_core::traits::IVectorStore;
use textsearch_core::{
    Document, DocumentId, SearchHit, SearchOptions, StorageId, StorageMeta, StorageSpec,
    TextSearchResult,
};

use crate::migrations;
use crate::pool::ConnectionPool;

/// SQLite-backed vector store. Owns the connection pool and provides
/// the full IVectorStore interface.
pub struct VectorStore {
    pool: ConnectionPool,
}

impl VectorStore {
    /// Open a vector store backed by a file on disk.
    pub fn open(path: &Path) -> TextSearchResult<Self> {
        let store = Self {
            pool: ConnectionPool::open(path)?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory vector store (for testing).
    pub fn open_in_memory() -> TextSearchResult<Self> {
        let store = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> TextSearchResult<()> {
        self.pool.write(migrations::run_migrations)
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Number of documents in a storage.
    pub fn document_count(&self, storage_id: StorageId) -> TextSearchResult<usize> {
        self.pool
            .read(|conn| crate::queries::document_ops::document_count(conn, storage_id))
    }

    /// Number of distinct embeddings in a storage's partition.
    pub fn embedding_count(&self, storage_id: StorageId) -> TextSearchResult<usize> {
        self.pool
            .read(|conn| crate::queries::document_ops::embedding_count(conn, storage_id))
    }
}

impl IVectorStore for VectorStore {
    fn create_storage(&self, spec: &StorageSpec) -> TextSearchResult<StorageId> {
        self.pool
            .write(|conn| crate::queries::registry_ops::create_storage(conn, spec))
    }

    fn get_storage(&self, id: StorageId) -> TextSearchResult<Option<StorageMeta>> {
        self.pool
            .read(|conn| crate::queries::registry_ops::get_storage(conn, id))
    }

    fn delete_storage(&self, id: StorageId) -> TextSearchResult<()> {
        self.pool
            .write(|conn| crate::queries::registry_ops::delete_storage(conn, id))
    }

    fn create_index(&self, id: StorageId) -> TextSearchResult<()> {
        self.pool
            .write(|conn| crate::queries::registry_ops::create_index(conn, id))
    }

    fn delete_index(&self, id: StorageId) -> TextSearchResult<()> {
        self.pool
            .write(|conn| crate::queries::registry_ops::delete_index(conn, id))
    }

    fn resolve_or_insert(
        &self,
        storage: &StorageMeta,
        key: &str,
        vector: Option<&[f32]>,
    ) -> TextSearchResult<Option<DocumentId>> {
        self.pool.write(|conn| {
            crate::queries::document_ops::resolve_or_insert(conn, storage, key, vector)
        })
    }

    fn delete_document(&self, id: DocumentId) -> TextSearchResult<()> {
        self.pool
            .write(|conn| crate::queries::document_ops::delete_document(conn, id))
    }

    fn get_document(&self, id: DocumentId) -> TextSearchResult<Option<Document>> {
        self.pool
            .read(|conn| crate::queries::document_ops::get_document(conn, id))
    }

    fn document_vector(&self, id: DocumentId) -> TextSearchResult<Vec<f32>> {
        self.pool
            .read(|conn| crate::queries::document_ops::document_vector(conn, id))
    }

    fn search(
        &self,
        storage: &StorageMeta,
        reference: &[f32],
        options: &SearchOptions,
    ) -> TextSearchResult<Vec<SearchHit>> {
        self.pool.read(|conn| {
            crate::queries::vector_search::search(conn, storage, reference, options)
        })
    }
}
