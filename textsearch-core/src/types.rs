//! Data model: storages (collections), embeddings, documents, search types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TextSearchError;

/// Identifier of a storage (collection). Monotonic registry id.
pub type StorageId = i64;

/// Identifier of an embedding, monotonic within its storage partition.
pub type EmbeddingId = i64;

/// Globally unique document identifier.
pub type DocumentId = i64;

/// The task a storage's embeddings are optimized for.
///
/// Passed through to the provider; some models produce different vectors
/// for queries than for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    RetrievalQuery,
    RetrievalDocument,
    SemanticSimilarity,
    Classification,
    Clustering,
    QuestionAnswering,
    FactVerification,
}

impl DocumentType {
    /// Canonical wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetrievalQuery => "RETRIEVAL_QUERY",
            Self::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            Self::SemanticSimilarity => "SEMANTIC_SIMILARITY",
            Self::Classification => "CLASSIFICATION",
            Self::Clustering => "CLUSTERING",
            Self::QuestionAnswering => "QUESTION_ANSWERING",
            Self::FactVerification => "FACT_VERIFICATION",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = TextSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RETRIEVAL_QUERY" => Ok(Self::RetrievalQuery),
            "RETRIEVAL_DOCUMENT" => Ok(Self::RetrievalDocument),
            "SEMANTIC_SIMILARITY" => Ok(Self::SemanticSimilarity),
            "CLASSIFICATION" => Ok(Self::Classification),
            "CLUSTERING" => Ok(Self::Clustering),
            "QUESTION_ANSWERING" => Ok(Self::QuestionAnswering),
            "FACT_VERIFICATION" => Ok(Self::FactVerification),
            other => Err(TextSearchError::ConfigurationError {
                message: format!("unknown document type: {other}"),
            }),
        }
    }
}

/// Parameters for creating a storage. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSpec {
    /// Embedding model name; fixes the vector space of the partition.
    pub model: String,
    pub document_type: DocumentType,
    pub vector_dimensions: usize,
    /// Store raw content as the embedding key. When false, a content
    /// digest is stored instead (saves space, keeps sensitive text out
    /// of the database).
    pub store_content: bool,
    /// At most one document per embedding; repeat inserts of the same
    /// content return the existing document id.
    pub unique_document: bool,
}

/// Registry row for a storage, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageMeta {
    pub id: StorageId,
    pub model: String,
    pub document_type: DocumentType,
    pub vector_dimensions: usize,
    pub store_content: bool,
    pub unique_document: bool,
    /// Whether the partition's similarity index currently exists.
    pub has_index: bool,
}

/// Caller-facing options for storage creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageOptions {
    pub store_content: bool,
    pub unique_document: bool,
    /// Deferring index creation is a write-throughput optimization for
    /// bulk loads; call `create_index` explicitly afterwards.
    pub create_index: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            store_content: false,
            unique_document: true,
            create_index: true,
        }
    }
}

/// A document row: one reference to an embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub storage_id: StorageId,
    pub embedding_id: EmbeddingId,
    pub created_at: DateTime<Utc>,
}

/// One similarity-search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: DocumentId,
    /// Cosine distance to the reference; lower is more similar.
    pub distance: f64,
}

/// Filters for a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Drop hits with distance greater than this.
    pub max_distance: Option<f64>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_distance: None,
            limit: 20,
        }
    }
}

/// Reference point for a similarity search.
#[derive(Debug, Clone)]
pub enum SearchReference {
    /// Use the stored vector of an existing document.
    Document(DocumentId),
    /// A raw vector of the storage's dimensionality.
    Vector(Vec<f32>),
}
