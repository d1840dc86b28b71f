//! Bounded storage-metadata cache with explicit invalidation.
//!
//! Lifecycle operations (`delete_storage`, index changes) invalidate the
//! entry; there is no TTL-only staleness window for correctness to lean on.

use std::sync::Arc;

use moka::sync::Cache;

use textsearch_core::traits::IEmbeddingProvider;
use textsearch_core::{StorageId, StorageMeta};

/// Cached per-storage state: registry metadata plus the provider resolved
/// once for the storage's model.
pub struct StorageHandle {
    pub meta: StorageMeta,
    pub provider: Arc<dyn IEmbeddingProvider>,
}

/// Moka-backed cache of storage handles.
pub struct MetadataCache {
    cache: Cache<StorageId, Arc<StorageHandle>>,
}

impl MetadataCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    pub fn get(&self, id: StorageId) -> Option<Arc<StorageHandle>> {
        self.cache.get(&id)
    }

    pub fn insert(&self, id: StorageId, handle: Arc<StorageHandle>) {
        self.cache.insert(id, handle);
    }

    /// Invalidation hook called by lifecycle operations.
    pub fn invalidate(&self, id: StorageId) {
        self.cache.invalidate(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textsearch_core::{DocumentType, TextSearchResult};

    struct NullProvider;

    impl IEmbeddingProvider for NullProvider {
        fn embed(&self, _: &str, _: DocumentType) -> TextSearchResult<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
        fn dimensions(&self) -> usize {
            4
        }
        fn model(&self) -> &str {
            "null"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    fn handle(id: StorageId) -> Arc<StorageHandle> {
        Arc::new(StorageHandle {
            meta: StorageMeta {
                id,
                model: "null".to_string(),
                document_type: DocumentType::RetrievalDocument,
                vector_dimensions: 4,
                store_content: false,
                unique_document: true,
                has_index: false,
            },
            provider: Arc::new(NullProvider),
        })
    }

    #[test]
    fn insert_and_get() {
        let cache = MetadataCache::new(16);
        cache.insert(1, handle(1));
        assert_eq!(cache.get(1).unwrap().meta.id, 1);
    }

    #[test]
    fn miss_returns_none() {
        let cache = MetadataCache::new(16);
        assert!(cache.get(99).is_none());
    }

    #[test]
    fn invalidate_removes_the_entry() {
        let cache = MetadataCache::new(16);
        cache.insert(1, handle(1));
        cache.invalidate(1);
        assert!(cache.get(1).is_none());
    }
}
