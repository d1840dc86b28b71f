//! Resolve-or-insert semantics, uniqueness policy, and embedding GC.

use textsearch_core::traits::IVectorStore;
use textsearch_core::{DocumentType, StorageMeta, StorageSpec, TextSearchError};
use textsearch_storage::VectorStore;

fn open_storage(store: &VectorStore, unique_document: bool) -> StorageMeta {
    let id = store
        .create_storage(&StorageSpec {
            model: "test-model".to_string(),
            document_type: DocumentType::RetrievalDocument,
            vector_dimensions: 2,
            store_content: true,
            unique_document,
        })
        .unwrap();
    store.get_storage(id).unwrap().unwrap()
}

#[test]
fn resolution_without_vector_has_no_side_effects() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    assert!(store.resolve_or_insert(&meta, "absent", None).unwrap().is_none());
    assert_eq!(store.document_count(meta.id).unwrap(), 0);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 0);
}

#[test]
fn insert_with_vector_creates_embedding_and_document() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    let doc = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .expect("document should be created");
    assert!(doc > 0);
    assert_eq!(store.document_count(meta.id).unwrap(), 1);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 1);
}

#[test]
fn resolution_after_insert_reuses_without_vector() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    let first = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();
    let second = store
        .resolve_or_insert(&meta, "hello", None)
        .unwrap()
        .expect("fast path should resolve");
    assert_eq!(first, second);
}

#[test]
fn reinserting_a_key_with_a_vector_keeps_the_stored_embedding() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    // A writer from another lock domain may supply a vector for a key
    // that already resolved; the existing row wins.
    let first = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();
    let second = store
        .resolve_or_insert(&meta, "hello", Some(&[0.0, 1.0]))
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 1);
    assert_eq!(store.document_vector(first).unwrap(), vec![1.0, 0.0]);
}

#[test]
fn reinserting_a_key_with_a_vector_honors_the_non_unique_policy() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, false);

    let a = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();
    let b = store
        .resolve_or_insert(&meta, "hello", Some(&[0.0, 1.0]))
        .unwrap()
        .unwrap();

    assert_ne!(a, b);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 1);
    assert_eq!(store.document_vector(b).unwrap(), vec![1.0, 0.0]);
}

#[test]
fn non_unique_storage_creates_distinct_documents_sharing_one_embedding() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, false);

    let a = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();
    let b = store
        .resolve_or_insert(&meta, "hello", None)
        .unwrap()
        .unwrap();

    assert_ne!(a, b);
    assert_eq!(store.document_count(meta.id).unwrap(), 2);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 1);
}

#[test]
fn dimension_mismatch_is_configuration_error() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    let err = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0, 0.0]))
        .unwrap_err();
    assert!(matches!(err, TextSearchError::ConfigurationError { .. }));
    assert_eq!(store.embedding_count(meta.id).unwrap(), 0);
}

#[test]
fn deleting_last_document_collects_the_embedding() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    let doc = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();
    store.delete_document(doc).unwrap();

    assert_eq!(store.document_count(meta.id).unwrap(), 0);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 0);
}

#[test]
fn deleting_non_last_document_keeps_the_embedding() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, false);

    let a = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();
    let b = store
        .resolve_or_insert(&meta, "hello", None)
        .unwrap()
        .unwrap();

    store.delete_document(a).unwrap();
    assert_eq!(store.document_count(meta.id).unwrap(), 1);
    assert_eq!(store.embedding_count(meta.id).unwrap(), 1);

    store.delete_document(b).unwrap();
    assert_eq!(store.embedding_count(meta.id).unwrap(), 0);
}

#[test]
fn deleting_unknown_document_is_not_found() {
    let store = VectorStore::open_in_memory().unwrap();
    let err = store.delete_document(12345).unwrap_err();
    assert!(matches!(
        err,
        TextSearchError::NotFound { entity: "document", id: 12345 }
    ));
}

#[test]
fn get_document_returns_the_row() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    let id = store
        .resolve_or_insert(&meta, "hello", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();

    let doc = store.get_document(id).unwrap().expect("document exists");
    assert_eq!(doc.id, id);
    assert_eq!(doc.storage_id, meta.id);
    assert!(doc.embedding_id > 0);
    assert!(doc.created_at <= chrono::Utc::now());

    assert!(store.get_document(id + 1).unwrap().is_none());
}

#[test]
fn document_vector_roundtrips() {
    let store = VectorStore::open_in_memory().unwrap();
    let meta = open_storage(&store, true);

    let doc = store
        .resolve_or_insert(&meta, "hello", Some(&[0.25, -0.5]))
        .unwrap()
        .unwrap();
    assert_eq!(store.document_vector(doc).unwrap(), vec![0.25, -0.5]);
}

#[test]
fn document_vector_of_unknown_document_is_not_found() {
    let store = VectorStore::open_in_memory().unwrap();
    assert!(matches!(
        store.document_vector(9).unwrap_err(),
        TextSearchError::NotFound { .. }
    ));
}

#[test]
fn partitions_are_isolated_per_storage() {
    let store = VectorStore::open_in_memory().unwrap();
    let a = open_storage(&store, true);
    let b = open_storage(&store, true);

    store
        .resolve_or_insert(&a, "shared text", Some(&[1.0, 0.0]))
        .unwrap()
        .unwrap();

    // Same key in a different storage is a miss.
    assert!(store.resolve_or_insert(&b, "shared text", None).unwrap().is_none());
    assert_eq!(store.embedding_count(a.id).unwrap(), 1);
    assert_eq!(store.embedding_count(b.id).unwrap(), 0);
}
