//! Physical records, one per table
//!
//! Keyed tables are written with a single upsert statement whose first
//! parameter is the key: a `NULL` key makes SQLite generate one, which is
//! then written back into the record.

mod account;
mod bricklink_tokens;
mod color_source;
mod container;

pub use account::{AccountRecord, AdministratorRecord, LockedAccountRecord};
pub use bricklink_tokens::BrickLinkTokensRecord;
pub use color_source::ColorSourceRecord;
pub use container::{
    ContainerRecord, ContainerTypeRecord, LockerRecord, PrivateContainerRecord,
    SharedContainerRecord,
};

use briventory_core::Result;
use rusqlite::{Connection, Params};

/// Run an upsert and capture the generated key when there was none.
fn merge_with_generated_key<P: Params>(
    conn: &Connection,
    id: &mut Option<i64>,
    sql: &str,
    params: P,
) -> Result<()> {
    conn.execute(sql, params)?;
    if id.is_none() {
        *id = Some(conn.last_insert_rowid());
    }
    Ok(())
}

fn delete_by_key(conn: &Connection, sql: &str, key: Option<i64>) -> Result<()> {
    let deleted = conn.execute(sql, [key])?;
    tracing::debug!(sql, deleted, "record delete");
    Ok(())
}
