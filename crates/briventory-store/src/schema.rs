//! The embedded inventory schema
//!
//! The script only creates what is missing, so it runs on every open.
//! Changing existing tables is out of its reach.

use briventory_core::Result;
use rusqlite::Connection;

pub const SCHEMA: &str = include_str!("../schema.sql");

/// Create the inventory tables and indexes that do not exist yet.
///
/// # Errors
///
/// Returns the driver error unchanged.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    tracing::debug!("schema ensured");
    Ok(())
}

/// Names of the tables present, sorted
///
/// # Errors
///
/// Returns the driver error unchanged.
pub fn tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}
