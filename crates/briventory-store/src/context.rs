//! SQLite persistence context

use crate::config::StoreConfig;
use crate::{db, schema};
use briventory_core::context::Work;
use briventory_core::{OrmError, PersistenceContext, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// One shared SQLite connection serving every unit of work
///
/// Units of work are serialized by the connection lock. Work running inside
/// a unit must use the connection it was given: opening another unit from
/// there, such as reading an unfetched lazy loader through
/// [`briventory_core::LazyLoader::value`], deadlocks.
pub struct SqliteContext {
    conn: Mutex<Connection>,
}

impl SqliteContext {
    /// Open and configure the database, creating missing tables when
    /// configured to.
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = db::open(config)?;
        if config.create_schema {
            schema::ensure_schema(&conn)?;
        }
        tracing::debug!(path = ?config.path, "sqlite context opened");
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| OrmError::internal("sqlite connection lock poisoned"))
    }
}

impl PersistenceContext for SqliteContext {
    fn consume_in_connection(&self, work: &mut Work<'_>) -> Result<()> {
        let conn = self.lock()?;
        work(&conn)
    }

    fn consume_in_transaction(&self, work: &mut Work<'_>) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        match work(&tx) {
            Ok(()) => {
                tx.commit()?;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "rolling back transaction");
                if let Err(rollback) = tx.rollback() {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
