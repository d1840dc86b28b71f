//! Versioned in-process migrations, tracked via `PRAGMA user_version`.

mod v001_registry;

use rusqlite::Connection;

use textsearch_core::{TextSearchError, TextSearchResult};

use crate::to_persistence_err;

type Migration = fn(&Connection) -> TextSearchResult<()>;

/// Ordered list of schema migrations. Append-only.
const MIGRATIONS: &[(u32, Migration)] = &[(1, v001_registry::migrate)];

/// Apply all pending migrations.
pub fn run_migrations(conn: &Connection) -> TextSearchResult<()> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_persistence_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| TextSearchError::PersistenceFailure {
            message: format!("migration v{version} failed: {e}"),
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| to_persistence_err(e.to_string()))?;
        tracing::info!(version, "applied schema migration");
    }

    Ok(())
}

/// Current schema version of a connection.
pub fn schema_version(conn: &Connection) -> TextSearchResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_persistence_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent_and_bump_the_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        run_migrations(&conn).unwrap();
        let version = schema_version(&conn).unwrap();
        assert_eq!(version as usize, MIGRATIONS.len());

        run_migrations(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), version);
    }
}
