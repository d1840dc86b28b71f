//! v001: storages registry and the global documents table.
//!
//! Embedding partitions are per-storage tables created by the registry at
//! storage-creation time, not by a migration.

use rusqlite::Connection;

use textsearch_core::TextSearchResult;

use crate::to_persistence_err;

pub fn migrate(conn: &Connection) -> TextSearchResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS storages (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            model             TEXT NOT NULL,
            document_type     TEXT NOT NULL,
            vector_dimensions INTEGER NOT NULL,
            store_content     INTEGER NOT NULL,
            unique_document   INTEGER NOT NULL,
            has_index         INTEGER NOT NULL DEFAULT 0,
            created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS documents (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            storage_id   INTEGER NOT NULL,
            embedding_id INTEGER NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_documents_storage ON documents(storage_id);
        CREATE INDEX IF NOT EXISTS idx_documents_embedding ON documents(storage_id, embedding_id);
        ",
    )
    .map_err(|e| to_persistence_err(e.to_string()))?;
    Ok(())
}
