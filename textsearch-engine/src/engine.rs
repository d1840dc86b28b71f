//! TextSearchEngine — the main entry point.
//!
//! Orchestrates content→embedding resolution: the fast-path cache lookup,
//! the single-flight lock, the double-checked re-resolve, the provider
//! call, and the conflict-safe insert. Also fronts storage lifecycle and
//! similarity search, keeping the metadata cache coherent.

use std::sync::Arc;

use tracing::{debug, info};

use textsearch_core::traits::{ILockService, IVectorStore};
use textsearch_core::{
    Document, DocumentId, DocumentType, EngineConfig, SearchHit, SearchOptions, SearchReference,
    StorageId, StorageMeta, StorageOptions, StorageSpec, TextSearchError, TextSearchResult,
};

use crate::key;
use crate::lock::LocalLockService;
use crate::metadata_cache::{MetadataCache, StorageHandle};
use crate::providers::ProviderRegistry;

/// The dedup engine.
///
/// Guarantees at most one embedding computation per distinct content per
/// storage under concurrency. Blocks until resolution; never returns a
/// "pending" state.
pub struct TextSearchEngine {
    store: Arc<dyn IVectorStore>,
    locks: Arc<dyn ILockService>,
    providers: ProviderRegistry,
    storages: MetadataCache,
    config: EngineConfig,
}

impl TextSearchEngine {
    /// Create an engine over the given store and lock service.
    pub fn new(
        store: Arc<dyn IVectorStore>,
        locks: Arc<dyn ILockService>,
        providers: ProviderRegistry,
        config: EngineConfig,
    ) -> Self {
        info!(
            lock_wait_ms = config.lock_wait_ms,
            metadata_cache_entries = config.metadata_cache_entries,
            "TextSearchEngine initialized"
        );
        let storages = MetadataCache::new(config.metadata_cache_entries);
        Self {
            store,
            locks,
            providers,
            storages,
            config,
        }
    }

    /// Convenience constructor for single-instance deployments.
    pub fn with_local_locks(
        store: Arc<dyn IVectorStore>,
        providers: ProviderRegistry,
        config: EngineConfig,
    ) -> Self {
        Self::new(store, Arc::new(LocalLockService::new()), providers, config)
    }

    /// Create a storage bound to `model` and `document_type`.
    ///
    /// The model must have a registered provider; its dimensionality fixes
    /// the partition's vector space. Index creation may be deferred via
    /// `options.create_index` for bulk loads.
    pub fn create_storage(
        &self,
        model: &str,
        document_type: DocumentType,
        options: StorageOptions,
    ) -> TextSearchResult<StorageId> {
        let provider = self.providers.get(model)?;
        let spec = StorageSpec {
            model: model.to_string(),
            document_type,
            vector_dimensions: provider.dimensions(),
            store_content: options.store_content,
            unique_document: options.unique_document,
        };
        let id = self.store.create_storage(&spec)?;
        if options.create_index {
            self.store.create_index(id)?;
        }
        Ok(id)
    }

    /// Destroy a storage and everything in it. Irreversible.
    pub fn delete_storage(&self, id: StorageId) -> TextSearchResult<()> {
        self.store.delete_storage(id)?;
        self.storages.invalidate(id);
        Ok(())
    }

    /// Build the storage's similarity index (no-op when present).
    pub fn create_index(&self, id: StorageId) -> TextSearchResult<()> {
        self.store.create_index(id)?;
        self.storages.invalidate(id);
        Ok(())
    }

    /// Drop the storage's similarity index (no-op when absent).
    pub fn delete_index(&self, id: StorageId) -> TextSearchResult<()> {
        self.store.delete_index(id)?;
        self.storages.invalidate(id);
        Ok(())
    }

    /// Registry metadata for a storage.
    pub fn storage_metadata(&self, id: StorageId) -> TextSearchResult<StorageMeta> {
        Ok(self.storage_handle(id)?.meta.clone())
    }

    /// Resolve `content` to a document, computing its embedding at most
    /// once per storage across all concurrent callers.
    pub fn create_document(
        &self,
        storage_id: StorageId,
        content: &str,
    ) -> TextSearchResult<DocumentId> {
        let handle = self.storage_handle(storage_id)?;
        let key = key::content_key(content, handle.meta.store_content);

        // Fast path: embedding already cached.
        if let Some(doc) = self.store.resolve_or_insert(&handle.meta, &key, None)? {
            debug!(storage_id, document_id = doc, "embedding cache hit");
            return Ok(doc);
        }

        // Slow path: single-flight per (storage, key). Identical content
        // in different storages contends independently.
        let lock_key = format!("create-embedding/{storage_id}/{key}");
        let _guard = self.locks.acquire(&lock_key, self.config.lock_wait())?;

        // Double-check: another caller may have computed the embedding
        // while we waited for the lock.
        if let Some(doc) = self.store.resolve_or_insert(&handle.meta, &key, None)? {
            debug!(
                storage_id,
                document_id = doc,
                "embedding computed by concurrent caller"
            );
            return Ok(doc);
        }

        let vector = handle.provider.embed(content, handle.meta.document_type)?;
        if vector.len() != handle.meta.vector_dimensions {
            return Err(TextSearchError::ConfigurationError {
                message: format!(
                    "provider '{}' returned {} dimensions, storage {} expects {}",
                    handle.meta.model,
                    vector.len(),
                    storage_id,
                    handle.meta.vector_dimensions
                ),
            });
        }

        match self.store.resolve_or_insert(&handle.meta, &key, Some(&vector))? {
            Some(doc) => {
                debug!(storage_id, document_id = doc, "embedding computed and stored");
                Ok(doc)
            }
            None => Err(TextSearchError::PersistenceFailure {
                message: "resolve_or_insert returned no document for a supplied vector".to_string(),
            }),
        }
        // _guard drops here: the lock is released on every exit path above.
    }

    /// Fetch a document row. `None` for unknown ids.
    pub fn get_document(&self, id: DocumentId) -> TextSearchResult<Option<Document>> {
        self.store.get_document(id)
    }

    /// Delete a document; its embedding is garbage collected when no
    /// other document references it.
    pub fn delete_document(&self, id: DocumentId) -> TextSearchResult<()> {
        self.store.delete_document(id)
    }

    /// Nearest neighbors of `reference` within a storage, ordered
    /// ascending by cosine distance.
    pub fn search(
        &self,
        storage_id: StorageId,
        reference: SearchReference,
        options: &SearchOptions,
    ) -> TextSearchResult<Vec<SearchHit>> {
        let handle = self.storage_handle(storage_id)?;
        let vector = match reference {
            SearchReference::Document(doc_id) => {
                let doc = self
                    .store
                    .get_document(doc_id)?
                    .ok_or_else(|| TextSearchError::document_not_found(doc_id))?;
                // A document from another storage must not leak in as a
                // reference even when the dimensions happen to match.
                if doc.storage_id != storage_id {
                    return Err(TextSearchError::document_not_found(doc_id));
                }
                self.store.document_vector(doc_id)?
            }
            SearchReference::Vector(v) => v,
        };
        self.store.search(&handle.meta, &vector, options)
    }

    fn storage_handle(&self, id: StorageId) -> TextSearchResult<Arc<StorageHandle>> {
        if let Some(handle) = self.storages.get(id) {
            return Ok(handle);
        }

        let meta = self
            .store
            .get_storage(id)?
            .ok_or_else(|| TextSearchError::storage_not_found(id))?;
        let provider = self.providers.get(&meta.model)?;
        let handle = Arc::new(StorageHandle { meta, provider });
        self.storages.insert(id, Arc::clone(&handle));
        Ok(handle)
    }
}
