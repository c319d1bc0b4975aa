//! SQLite persistence layer for the airport registry.
//!
//! Provides registry opening with sentinel-column migration, read-only
//! validation, and the row-level reset/mark operations the reconciliation
//! engine drives. Backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod schema;
pub mod validate;

pub use rusqlite::Connection;

pub use operations::{OperationError, SENTINEL, clear_marked, mark_addon};
pub use schema::{
    AIRPORT_TABLE, SENTINEL_COLUMN, SchemaError, create_schema, ensure_sentinel_column,
    open_memory, open_registry,
};
pub use validate::{RegistryCheck, check_registry};
