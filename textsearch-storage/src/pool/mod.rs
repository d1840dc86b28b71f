//! SQLite connection management.
//!
//! All mutations go through one write connection behind a mutex; that
//! serialization is what makes `resolve_or_insert` atomic per key. A
//! file-backed database additionally gets a few read-only connections
//! (WAL readers are never blocked by the writer). An in-memory database
//! gets none: every in-memory connection is its own database, so reads
//! go through the writer there.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use textsearch_core::TextSearchResult;

use crate::to_persistence_err;

/// Readers opened per file-backed database.
const READ_CONNECTIONS: usize = 4;

pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
    db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a pool over a database file, creating it if absent.
    pub fn open(path: &Path) -> TextSearchResult<Self> {
        let writer = Connection::open(path).map_err(|e| to_persistence_err(e.to_string()))?;
        configure_writer(&writer)?;

        let mut readers = Vec::with_capacity(READ_CONNECTIONS);
        for _ in 0..READ_CONNECTIONS {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| to_persistence_err(e.to_string()))?;
            configure_reader(&conn)?;
            readers.push(Mutex::new(conn));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            next_reader: AtomicUsize::new(0),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (for testing). Writer only.
    pub fn open_in_memory() -> TextSearchResult<Self> {
        let writer =
            Connection::open_in_memory().map_err(|e| to_persistence_err(e.to_string()))?;
        configure_writer(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
            db_path: None,
        })
    }

    /// Run a mutation with exclusive access to the write connection.
    pub fn write<F, T>(&self, f: F) -> TextSearchResult<T>
    where
        F: FnOnce(&Connection) -> TextSearchResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| to_persistence_err(format!("write connection poisoned: {e}")))?;
        f(&conn)
    }

    /// Run a read-only query, round-robining over the readers. Falls back
    /// to the writer when the pool has none (in-memory mode).
    pub fn read<F, T>(&self, f: F) -> TextSearchResult<T>
    where
        F: FnOnce(&Connection) -> TextSearchResult<T>,
    {
        if self.readers.is_empty() {
            return self.write(f);
        }
        let idx = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| to_persistence_err(format!("read connection poisoned: {e}")))?;
        f(&conn)
    }

    /// Path of the backing file; `None` for in-memory pools.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Journal mode the writer is running in.
    pub fn journal_mode(&self) -> TextSearchResult<String> {
        self.write(|conn| {
            conn.pragma_query_value(None, "journal_mode", |row| row.get(0))
                .map_err(|e| to_persistence_err(e.to_string()))
        })
    }
}

// WAL with NORMAL sync; page cache and mmap sized for vector blobs.
fn configure_writer(conn: &Connection) -> TextSearchResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -64000;
        PRAGMA mmap_size = 268435456;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_persistence_err(e.to_string()))
}

fn configure_reader(conn: &Connection) -> TextSearchResult<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -64000;
        PRAGMA mmap_size = 268435456;
        ",
    )
    .map_err(|e| to_persistence_err(e.to_string()))
}
