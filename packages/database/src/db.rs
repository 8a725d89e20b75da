//! Database connection utilities and schema creation.

use std::path::Path;

use rusqlite::Connection;

use crate::DbError;

/// Default database filename, next to wherever the tool is run.
pub const DEFAULT_DB_PATH: &str = "hidden_spots.db";

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "SPOT_MAP_DB";

/// Opens (or creates) the spots database and ensures the schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Opens the database at the path from the `SPOT_MAP_DB` environment
/// variable, falling back to [`DEFAULT_DB_PATH`].
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn connect_from_env() -> Result<Connection, DbError> {
    let path = std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    log::debug!("Opening spots database at {path}");
    open(Path::new(&path))
}

/// Opens an in-memory database with the schema applied. Used in tests.
///
/// # Errors
///
/// Returns [`DbError`] if schema creation fails.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS spots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            source_url TEXT,
            raw_text TEXT,
            extracted_name TEXT,
            latitude REAL,
            longitude REAL,
            location_type TEXT,
            activities TEXT,
            is_hidden INTEGER DEFAULT 0,
            mentions_count INTEGER DEFAULT 1,
            scraped_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            metadata TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_spots_coordinates
            ON spots(latitude, longitude);
        CREATE INDEX IF NOT EXISTS idx_spots_source
            ON spots(source);
        CREATE INDEX IF NOT EXISTS idx_spots_scraped_at
            ON spots(scraped_at);
        CREATE INDEX IF NOT EXISTS idx_spots_source_date
            ON spots(source, scraped_at);
        CREATE INDEX IF NOT EXISTS idx_spots_location_type
            ON spots(location_type);",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM spots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn indexes_exist() {
        let conn = open_in_memory().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name LIKE 'idx_spots_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }
}
