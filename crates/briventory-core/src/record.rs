//! Physical records
//!
//! A record maps one row of one table. The core never builds statements for
//! records itself; each record knows how to upsert and remove its own row.

use crate::errors::Result;
use rusqlite::Connection;
use std::fmt::Debug;

/// A row that can be written by key and removed by key
pub trait UpdatableRecord: Debug {
    /// Insert or update the row.
    ///
    /// A record without a key receives the key generated by the store, so
    /// later cascade steps can reference it.
    ///
    /// # Errors
    ///
    /// Returns the driver error unchanged.
    fn merge(&mut self, conn: &Connection) -> Result<()>;

    /// Remove the row identified by this record's key.
    ///
    /// # Errors
    ///
    /// Returns the driver error unchanged.
    fn delete(&self, conn: &Connection) -> Result<()>;
}
