//! Storage registry lifecycle: create/get/delete storages, index management.

use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use textsearch_core::{
    DocumentType, StorageId, StorageMeta, StorageSpec, TextSearchError, TextSearchResult,
};

use super::{partition_index, partition_table};
use crate::to_persistence_err;

/// Allocate a registry row and the storage's embedding partition.
/// Wrapped in a transaction: registry row + partition DDL are all-or-nothing.
pub fn create_storage(conn: &Connection, spec: &StorageSpec) -> TextSearchResult<StorageId> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_persistence_err(format!("create_storage begin: {e}")))?;

    let id = match create_storage_inner(&tx, spec) {
        Ok(id) => {
            tx.commit()
                .map_err(|e| to_persistence_err(format!("create_storage commit: {e}")))?;
            id
        }
        Err(e) => {
            let _ = tx.rollback();
            return Err(e);
        }
    };

    info!(
        storage_id = id,
        model = %spec.model,
        document_type = %spec.document_type,
        dims = spec.vector_dimensions,
        "storage created"
    );
    Ok(id)
}

fn create_storage_inner(conn: &Connection, spec: &StorageSpec) -> TextSearchResult<StorageId> {
    conn.execute(
        "INSERT INTO storages (
            model, document_type, vector_dimensions, store_content, unique_document
        ) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            spec.model,
            spec.document_type.as_str(),
            spec.vector_dimensions as i64,
            spec.store_content as i32,
            spec.unique_document as i32,
        ],
    )
    .map_err(|e| to_persistence_err(e.to_string()))?;

    let id = conn.last_insert_rowid();

    let table = partition_table(id);
    conn.execute_batch(&format!(
        "CREATE TABLE {table} (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            key        TEXT NOT NULL UNIQUE,
            vector     BLOB NOT NULL,
            dimensions INTEGER NOT NULL
        );"
    ))
    .map_err(|e| to_persistence_err(e.to_string()))?;

    Ok(id)
}

/// Fetch a storage's registry metadata. `None` for unknown ids.
pub fn get_storage(conn: &Connection, id: StorageId) -> TextSearchResult<Option<StorageMeta>> {
    let row: Option<(String, String, i64, i64, i64, i64)> = conn
        .query_row(
            "SELECT model, document_type, vector_dimensions, store_content,
                    unique_document, has_index
             FROM storages WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let Some((model, document_type, dims, store_content, unique_document, has_index)) = row else {
        return Ok(None);
    };

    Ok(Some(StorageMeta {
        id,
        model,
        document_type: DocumentType::from_str(&document_type)?,
        vector_dimensions: dims as usize,
        store_content: store_content != 0,
        unique_document: unique_document != 0,
        has_index: has_index != 0,
    }))
}

/// Drop the partition (embeddings and index), the storage's documents,
/// and the registry row, atomically. Irreversible.
pub fn delete_storage(conn: &Connection, id: StorageId) -> TextSearchResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_persistence_err(format!("delete_storage begin: {e}")))?;

    match delete_storage_inner(&tx, id) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_persistence_err(format!("delete_storage commit: {e}")))?;
            info!(storage_id = id, "storage deleted");
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn delete_storage_inner(conn: &Connection, id: StorageId) -> TextSearchResult<()> {
    require_storage(conn, id)?;

    // Dropping the partition drops its index with it.
    let table = partition_table(id);
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))
        .map_err(|e| to_persistence_err(e.to_string()))?;

    conn.execute("DELETE FROM documents WHERE storage_id = ?1", params![id])
        .map_err(|e| to_persistence_err(e.to_string()))?;

    conn.execute("DELETE FROM storages WHERE id = ?1", params![id])
        .map_err(|e| to_persistence_err(e.to_string()))?;

    Ok(())
}

/// Build the partition's similarity index. No-op when it already exists.
///
/// With the brute-force cosine scan this is a plain B-tree over the vector
/// column standing in for an ANN index; the lifecycle (deferral for bulk
/// loads, explicit deletion) is what the registry tracks.
pub fn create_index(conn: &Connection, id: StorageId) -> TextSearchResult<()> {
    require_storage(conn, id)?;

    let table = partition_table(id);
    let index = partition_index(id);
    conn.execute_batch(&format!("CREATE INDEX IF NOT EXISTS {index} ON {table} (vector);"))
        .map_err(|e| to_persistence_err(e.to_string()))?;

    conn.execute("UPDATE storages SET has_index = 1 WHERE id = ?1", params![id])
        .map_err(|e| to_persistence_err(e.to_string()))?;

    debug!(storage_id = id, "similarity index created");
    Ok(())
}

/// Drop the partition's similarity index. No-op when absent.
pub fn delete_index(conn: &Connection, id: StorageId) -> TextSearchResult<()> {
    require_storage(conn, id)?;

    let index = partition_index(id);
    conn.execute_batch(&format!("DROP INDEX IF EXISTS {index};"))
        .map_err(|e| to_persistence_err(e.to_string()))?;

    conn.execute("UPDATE storages SET has_index = 0 WHERE id = ?1", params![id])
        .map_err(|e| to_persistence_err(e.to_string()))?;

    debug!(storage_id = id, "similarity index dropped");
    Ok(())
}

/// Error with `NotFound` unless the registry row exists.
pub fn require_storage(conn: &Connection, id: StorageId) -> TextSearchResult<()> {
    let exists: Option<i64> = conn
        .query_row("SELECT 1 FROM storages WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| to_persistence_err(e.to_string()))?;

    if exists.is_some() {
        Ok(())
    } else {
        Err(TextSearchError::storage_not_found(id))
    }
}
