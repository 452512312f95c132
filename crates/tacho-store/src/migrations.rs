//! Schema versioning.
//!
//! Creates the base schema and tracks a version number through
//! `PRAGMA user_version` so later releases can migrate in place.

use rusqlite::Connection;

use tacho_compliance::{StoreError, StoreResult};

use crate::schema::SCHEMA;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema and bring it up to the current version.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| StoreError::Backend(format!("schema creation failed: {e}")))?;

    let version = schema_version(conn)?;
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> StoreResult<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StoreError::Backend(format!("could not read schema version: {e}")))
}

fn run_migrations(conn: &Connection, from_version: i32) -> StoreResult<()> {
    let mut current = from_version;
    while current < CURRENT_VERSION {
        current += 1;
        run_migration(conn, current)?;
    }
    // PRAGMA does not support bound parameters.
    conn.execute_batch(&format!("PRAGMA user_version = {CURRENT_VERSION}"))
        .map_err(|e| StoreError::Backend(format!("could not set schema version: {e}")))?;
    Ok(())
}

fn run_migration(_conn: &Connection, version: i32) -> StoreResult<()> {
    match version {
        // Version 1 is the base schema, created above.
        1 => Ok(()),
        other => Err(StoreError::Backend(format!(
            "unknown schema version: {other}"
        ))),
    }
}
