//! Registry opening and sentinel-column migration.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Name of the table holding airport rows.
pub const AIRPORT_TABLE: &str = "airport";

/// Column stamped on every row this tool writes, scoping later resets to
/// our own markings.
pub const SENTINEL_COLUMN: &str = "addon_source";

/// Open an existing registry database for writing.
///
/// Never creates the file — the registry must already be populated by the
/// navigation tool. Registries that have never seen this tool are upgraded
/// in place by adding the sentinel column.
pub fn open_registry(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    ensure_sentinel_column(&conn)?;
    Ok(conn)
}

/// Open an in-memory registry with the minimal airport schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Create the minimal airport table this tool operates on.
///
/// The real registry ships fully populated by the navigation tool; this
/// exists for [`open_memory`] and file-backed test fixtures.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Add the sentinel column to the airport table when it is missing.
///
/// Existing rows read back NULL for the new column, i.e. "not written by
/// this tool".
pub fn ensure_sentinel_column(conn: &Connection) -> Result<(), SchemaError> {
    if !has_column(conn, AIRPORT_TABLE, SENTINEL_COLUMN)? {
        conn.execute_batch("ALTER TABLE airport ADD COLUMN addon_source TEXT;")?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, SchemaError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        rusqlite::params![table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS airport (
    airport_id INTEGER PRIMARY KEY,
    ident TEXT NOT NULL,
    name TEXT,
    is_addon INTEGER NOT NULL DEFAULT 0,
    scenery_local_path TEXT,
    addon_source TEXT
);
CREATE INDEX IF NOT EXISTS idx_airport_ident ON airport(ident);
"#;
