//! Read-only registry validation.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::schema::AIRPORT_TABLE;

/// Verdict from probing a registry file.
#[derive(Debug, Clone)]
pub struct RegistryCheck {
    pub valid: bool,
    pub diagnostic: String,
}

impl RegistryCheck {
    fn ok(diagnostic: impl Into<String>) -> Self {
        Self {
            valid: true,
            diagnostic: diagnostic.into(),
        }
    }

    fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            valid: false,
            diagnostic: diagnostic.into(),
        }
    }
}

/// Probe a registry database without mutating it.
///
/// Never raises: a missing file, an unopenable or corrupt file, and a
/// database without the airport table all come back as an invalid check
/// with a distinguishing diagnostic.
pub fn check_registry(path: &Path) -> RegistryCheck {
    if !path.is_file() {
        return RegistryCheck::fail(format!(
            "registry database does not exist at: {}",
            path.display()
        ));
    }

    // Read-only flags: a plain open would create a missing file mid-probe.
    let conn = match Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    ) {
        Ok(conn) => conn,
        Err(e) => {
            return RegistryCheck::fail(format!(
                "cannot open registry database {}: {e}",
                path.display()
            ));
        }
    };

    match has_airport_table(&conn) {
        Ok(true) => RegistryCheck::ok(format!(
            "registry database is valid and contains the '{AIRPORT_TABLE}' table"
        )),
        Ok(false) => RegistryCheck::fail(format!(
            "registry database {} does not contain a table named '{AIRPORT_TABLE}'",
            path.display()
        )),
        Err(e) => RegistryCheck::fail(format!(
            "cannot read registry database {}: {e}",
            path.display()
        )),
    }
}

fn has_airport_table(conn: &Connection) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
        [AIRPORT_TABLE],
        |row| row.get(0),
    )
}
