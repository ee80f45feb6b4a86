//! Database connection management

use crate::config::StoreConfig;
use briventory_core::Result;
use rusqlite::Connection;

/// Open the connection described by `config`, without creating tables.
///
/// # Errors
///
/// Returns the driver error when the file cannot be opened or configured.
pub fn open(config: &StoreConfig) -> Result<Connection> {
    let conn = match &config.path {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };
    configure(&conn, config)?;
    Ok(conn)
}

/// Apply connection-level pragmas.
///
/// # Errors
///
/// Returns the driver error unchanged.
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;

    // journal_mode returns a row, so it goes through execute_batch
    if config.wal && config.path.is_some() {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    }
    Ok(())
}
