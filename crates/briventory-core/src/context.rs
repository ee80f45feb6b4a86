//! Units of work over the storage driver
//!
//! A `PersistenceContext` hands a live connection to a piece of work, either
//! plainly or wrapped in a transaction that commits when the work returns `Ok`
//! and rolls back when it returns `Err`.

use crate::errors::{OrmError, Result};
use rusqlite::Connection;

/// Work executed against a connection
pub type Work<'w> = dyn FnMut(&Connection) -> Result<()> + 'w;

/// Source of connections and transaction scopes
///
/// Implementations must be shareable across threads: repositories and lazy
/// loaders hold an `Arc<dyn PersistenceContext>`.
///
/// Scopes are not re-entrant. Code already running inside a scope receives
/// the connection and must pass it on instead of opening a new scope.
pub trait PersistenceContext: Send + Sync {
    /// Run `work` on a connection without an explicit transaction.
    ///
    /// # Errors
    ///
    /// Returns whatever `work` returns, or a driver error when no connection
    /// could be obtained.
    fn consume_in_connection(&self, work: &mut Work<'_>) -> Result<()>;

    /// Run `work` inside a transaction.
    ///
    /// The transaction commits if `work` returns `Ok` and rolls back
    /// otherwise; the error is propagated unchanged.
    ///
    /// # Errors
    ///
    /// Returns whatever `work` returns, or a driver error raised while
    /// opening or committing the transaction.
    fn consume_in_transaction(&self, work: &mut Work<'_>) -> Result<()>;
}

/// Value-producing variants of the context primitives
pub trait PersistenceContextExt: PersistenceContext {
    /// # Errors
    ///
    /// Returns whatever `work` returns.
    fn produce_in_connection<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut work = Some(work);
        let mut produced = None;
        self.consume_in_connection(&mut |conn: &Connection| {
            if let Some(work) = work.take() {
                produced = Some(work(conn)?);
            }
            Ok(())
        })?;
        produced.ok_or_else(|| OrmError::internal("unit of work did not run"))
    }

    /// # Errors
    ///
    /// Returns whatever `work` returns; the transaction is rolled back in
    /// that case.
    fn produce_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut work = Some(work);
        let mut produced = None;
        self.consume_in_transaction(&mut |conn: &Connection| {
            if let Some(work) = work.take() {
                produced = Some(work(conn)?);
            }
            Ok(())
        })?;
        produced.ok_or_else(|| OrmError::internal("unit of work did not run"))
    }
}

impl<C: PersistenceContext + ?Sized> PersistenceContextExt for C {}
