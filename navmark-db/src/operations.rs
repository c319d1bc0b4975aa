//! Row-level reset and mark operations on the airport table.

use rusqlite::{Connection, params};
use thiserror::Error;

/// Value written into the sentinel column of every row this tool marks.
pub const SENTINEL: &str = "navmark";

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Clear addon status on every row previously marked by this tool.
///
/// Rows flagged addon by anything else (sentinel column NULL or foreign)
/// are left alone. Returns the number of rows cleared.
pub fn clear_marked(conn: &Connection) -> Result<u64, OperationError> {
    let cleared = conn.execute(
        "UPDATE airport SET is_addon = 0, scenery_local_path = '', addon_source = NULL
         WHERE addon_source = ?1",
        params![SENTINEL],
    )?;
    Ok(cleared as u64)
}

/// Mark every airport matching `ident` (case-insensitive) as addon-sourced,
/// stamping the scenery path and the sentinel.
///
/// The stored identifier case is never altered. Returns the number of rows
/// changed; zero means the identifier is not present in the registry.
pub fn mark_addon(conn: &Connection, ident: &str, scenery_path: &str) -> Result<u64, OperationError> {
    let changed = conn.execute(
        "UPDATE airport SET is_addon = 1, scenery_local_path = ?2, addon_source = ?3
         WHERE UPPER(ident) = ?1",
        params![ident.to_uppercase(), scenery_path, SENTINEL],
    )?;
    Ok(changed as u64)
}
