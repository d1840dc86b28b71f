//! The atomic resolve-or-insert-document operation, document deletion with
//! embedding garbage collection, and document introspection.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use textsearch_core::{
    Document, DocumentId, EmbeddingId, StorageId, StorageMeta, TextSearchError, TextSearchResult,
};

use super::partition_table;
use super::vector_blob::{bytes_to_f32_vec, f32_vec_to_bytes};
use crate::to_persistence_err;

/// Resolve-or-insert, the one operation the dedup engine builds on.
///
/// Without a vector this is pure resolution: `None` when no embedding
/// exists for `key`, with no side effects. With a vector, the embedding is
/// inserted conflict-safely (a concurrent duplicate on the key resolves to
/// the existing row instead of erroring) and the document is inserted or
/// reused per the storage's uniqueness policy.
///
/// Wrapped in a transaction: embedding + document are all-or-nothing.
pub fn resolve_or_insert(
    conn: &Connection,
    storage: &StorageMeta,
    key: &str,
    vector: Option<&[f32]>,
) -> TextSearchResult<Option<DocumentId>> {
    if let Some(v) = vector {
        if v.len() != storage.vector_dimensions {
            return Err(TextSearchError::ConfigurationError {
                message: format!(
                    "vector has {} dimensions, storage {} expects {}",
                    v.len(),
                    storage.id,
                    storage.vector_dimensions
                ),
            });
        }
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_persistence_err(format!("resolve_or_insert begin: {e}")))?;

    match resolve_or_insert_inner(&tx, storage, key, vector) {
        Ok(result) => {
            tx.commit()
                .map_err(|e| to_persistence_err(format!("resolve_or_insert commit: {e}")))?;
            Ok(result)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn resolve_or_insert_inner(
    conn: &Connection,
    storage: &StorageMeta,
    key: &str,
    vector: Option<&[f32]>,
) -> TextSearchResult<Option<DocumentId>> {
    let table = partition_table(storage.id);

    let existing: Option<EmbeddingId> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE key = ?1"),
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let embedding_id = match existing {
        Some(id) => id,
        None => {
            let Some(vector) = vector else {
                // Resolution-only call, nothing to resolve.
                return Ok(None);
            };

            conn.execute(
                &format!(
                    "INSERT INTO {table} (key, vector, dimensions)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO NOTHING"
                ),
                params![key, f32_vec_to_bytes(vector), vector.len() as i64],
            )
            .map_err(|e| to_persistence_err(e.to_string()))?;

            // Re-select instead of trusting last_insert_rowid: a writer
            // from another lock domain may have hit the conflict branch.
            conn.query_row(
                &format!("SELECT id FROM {table} WHERE key = ?1"),
                params![key],
                |row| row.get(0),
            )
            .map_err(|e| to_persistence_err(e.to_string()))?
        }
    };

    if storage.unique_document {
        let existing_doc: Option<DocumentId> = conn
            .query_row(
                "SELECT id FROM documents
                 WHERE storage_id = ?1 AND embedding_id = ?2
                 ORDER BY id LIMIT 1",
                params![storage.id, embedding_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| to_persistence_err(e.to_string()))?;

        if let Some(doc_id) = existing_doc {
            debug!(
                storage_id = storage.id,
                document_id = doc_id,
                "unique document reused"
            );
            return Ok(Some(doc_id));
        }
    }

    conn.execute(
        "INSERT INTO documents (storage_id, embedding_id) VALUES (?1, ?2)",
        params![storage.id, embedding_id],
    )
    .map_err(|e| to_persistence_err(e.to_string()))?;

    Ok(Some(conn.last_insert_rowid()))
}

/// Delete a document. When no other document references its embedding,
/// the embedding is deleted too (garbage collection invariant).
pub fn delete_document(conn: &Connection, id: DocumentId) -> TextSearchResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_persistence_err(format!("delete_document begin: {e}")))?;

    match delete_document_inner(&tx, id) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_persistence_err(format!("delete_document commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn delete_document_inner(conn: &Connection, id: DocumentId) -> TextSearchResult<()> {
    let row: Option<(StorageId, EmbeddingId)> = conn
        .query_row(
            "SELECT storage_id, embedding_id FROM documents WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let Some((storage_id, embedding_id)) = row else {
        return Err(TextSearchError::document_not_found(id));
    };

    conn.execute("DELETE FROM documents WHERE id = ?1", params![id])
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM documents WHERE storage_id = ?1 AND embedding_id = ?2",
            params![storage_id, embedding_id],
            |row| row.get(0),
        )
        .map_err(|e| to_persistence_err(e.to_string()))?;

    if remaining == 0 {
        let table = partition_table(storage_id);
        conn.execute(
            &format!("DELETE FROM {table} WHERE id = ?1"),
            params![embedding_id],
        )
        .map_err(|e| to_persistence_err(e.to_string()))?;
        debug!(storage_id, embedding_id, "orphaned embedding collected");
    }

    Ok(())
}

/// Fetch a document row. `None` for unknown ids.
pub fn get_document(conn: &Connection, id: DocumentId) -> TextSearchResult<Option<Document>> {
    let row: Option<(StorageId, EmbeddingId, String)> = conn
        .query_row(
            "SELECT storage_id, embedding_id, created_at FROM documents WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let Some((storage_id, embedding_id, created_at)) = row else {
        return Ok(None);
    };

    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| to_persistence_err(format!("bad created_at timestamp: {e}")))?
        .with_timezone(&Utc);

    Ok(Some(Document {
        id,
        storage_id,
        embedding_id,
        created_at,
    }))
}

/// Stored vector of a document.
pub fn document_vector(conn: &Connection, id: DocumentId) -> TextSearchResult<Vec<f32>> {
    let row: Option<(StorageId, EmbeddingId)> = conn
        .query_row(
            "SELECT storage_id, embedding_id FROM documents WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let Some((storage_id, embedding_id)) = row else {
        return Err(TextSearchError::document_not_found(id));
    };

    let table = partition_table(storage_id);
    let blob: Vec<u8> = conn
        .query_row(
            &format!("SELECT vector FROM {table} WHERE id = ?1"),
            params![embedding_id],
            |row| row.get(0),
        )
        .map_err(|e| to_persistence_err(e.to_string()))?;

    Ok(bytes_to_f32_vec(&blob))
}

/// Number of documents in a storage.
pub fn document_count(conn: &Connection, storage_id: StorageId) -> TextSearchResult<usize> {
    super::registry_ops::require_storage(conn, storage_id)?;
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM documents WHERE storage_id = ?1",
            params![storage_id],
            |row| row.get(0),
        )
        .map_err(|e| to_persistence_err(e.to_string()))?;
    Ok(count as usize)
}

/// Number of distinct embeddings in a storage's partition.
pub fn embedding_count(conn: &Connection, storage_id: StorageId) -> TextSearchResult<usize> {
    super::registry_ops::require_storage(conn, storage_id)?;
    let table = partition_table(storage_id);
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(|e| to_persistence_err(e.to_string()))?;
    Ok(count as usize)
}
