//! Serde and parsing round-trips for the core model types.

use std::str::FromStr;

use textsearch_core::{DocumentType, SearchOptions, StorageOptions, TextSearchError};

#[test]
fn document_type_roundtrips_through_str() {
    let all = [
        DocumentType::RetrievalQuery,
        DocumentType::RetrievalDocument,
        DocumentType::SemanticSimilarity,
        DocumentType::Classification,
        DocumentType::Clustering,
        DocumentType::QuestionAnswering,
        DocumentType::FactVerification,
    ];
    for ty in all {
        let parsed = DocumentType::from_str(ty.as_str()).unwrap();
        assert_eq!(parsed, ty);
    }
}

#[test]
fn document_type_serde_uses_screaming_snake_case() {
    let json = serde_json::to_string(&DocumentType::RetrievalDocument).unwrap();
    assert_eq!(json, "\"RETRIEVAL_DOCUMENT\"");
    let back: DocumentType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, DocumentType::RetrievalDocument);
}

#[test]
fn unknown_document_type_is_configuration_error() {
    let err = DocumentType::from_str("RERANKING").unwrap_err();
    assert!(matches!(err, TextSearchError::ConfigurationError { .. }));
}

#[test]
fn storage_options_default_to_unique_indexed_digest() {
    let opts = StorageOptions::default();
    assert!(!opts.store_content);
    assert!(opts.unique_document);
    assert!(opts.create_index);
}

#[test]
fn search_options_default_has_no_distance_cutoff() {
    let opts = SearchOptions::default();
    assert!(opts.max_distance.is_none());
    assert!(opts.limit > 0);
}

#[test]
fn error_display_names_the_entity() {
    let err = TextSearchError::storage_not_found(42);
    assert_eq!(err.to_string(), "storage not found: 42");
    let err = TextSearchError::document_not_found(7);
    assert_eq!(err.to_string(), "document not found: 7");
}
