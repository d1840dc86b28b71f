//! SQL operations, grouped by concern.

pub mod document_ops;
pub mod registry_ops;
pub mod vector_blob;
pub mod vector_search;

use textsearch_core::StorageId;

/// Name of a storage's embedding partition table.
///
/// Storage ids come from our own registry sequence, so interpolating them
/// into DDL/DML is safe.
pub fn partition_table(storage_id: StorageId) -> String {
    format!("storage_embeddings_{storage_id}")
}

/// Name of a partition's similarity index.
pub fn partition_index(storage_id: StorageId) -> String {
    format!("storage_embeddings_{storage_id}_vector_idx")
}
