//! Deferred side effects performed inside a unit of work
//!
//! Models return actions to run before or after their own records are
//! written. Record actions write a single row; model actions go through a
//! repository so nested models get their full pipeline.

use crate::errors::Result;
use crate::model::{DeletableModel, PersistableModel, ValidatableModel};
use crate::record::UpdatableRecord;
use crate::repository::Repository;
use rusqlite::Connection;
use std::fmt;

pub trait Action: fmt::Debug {
    /// # Errors
    ///
    /// Returns the failure of the underlying write, unchanged.
    fn perform(self: Box<Self>, conn: &Connection) -> Result<()>;
}

pub type Actions = Vec<Box<dyn Action>>;

/// Perform actions in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the error of the first failing action.
pub fn perform_all(actions: Actions, conn: &Connection) -> Result<()> {
    for action in actions {
        tracing::debug!(action = ?action, "performing action");
        action.perform(conn)?;
    }
    Ok(())
}

/// Wrap one action.
pub fn single<A: Action + 'static>(action: A) -> Actions {
    let action: Box<dyn Action> = Box::new(action);
    vec![action]
}

/// Actions creator for relations whose state lives on the owner's record.
///
/// # Errors
///
/// Never fails.
pub fn no_actions<K, V>(_conn: &Connection, _key: &K, _value: &V) -> Result<Actions> {
    Ok(Vec::new())
}

/// Merge a single record
#[derive(Debug)]
pub struct PersistRecordAction<R> {
    record: R,
}

impl<R: UpdatableRecord> PersistRecordAction<R> {
    pub fn new(record: R) -> Self {
        Self { record }
    }
}

impl<R: UpdatableRecord> Action for PersistRecordAction<R> {
    fn perform(self: Box<Self>, conn: &Connection) -> Result<()> {
        let mut record = self.record;
        record.merge(conn)
    }
}

/// Delete a single record
#[derive(Debug)]
pub struct DeleteRecordAction<R> {
    record: R,
}

impl<R: UpdatableRecord> DeleteRecordAction<R> {
    pub fn new(record: R) -> Self {
        Self { record }
    }
}

impl<R: UpdatableRecord> Action for DeleteRecordAction<R> {
    fn perform(self: Box<Self>, conn: &Connection) -> Result<()> {
        self.record.delete(conn)
    }
}

/// Persist models through a repository, validation included
pub struct PersistAction<M, P> {
    repository: Repository<M>,
    models: Vec<P>,
}

impl<M, P> PersistAction<M, P> {
    pub fn new(repository: Repository<M>, models: Vec<P>) -> Self {
        Self { repository, models }
    }

    pub fn one(repository: Repository<M>, model: P) -> Self {
        Self::new(repository, vec![model])
    }
}

impl<M, P: fmt::Debug> fmt::Debug for PersistAction<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistAction")
            .field("models", &self.models)
            .finish()
    }
}

impl<M, P> Action for PersistAction<M, P>
where
    P: PersistableModel + ValidatableModel + fmt::Debug,
{
    fn perform(self: Box<Self>, conn: &Connection) -> Result<()> {
        let PersistAction {
            repository,
            mut models,
        } = *self;
        for model in models.iter_mut() {
            repository.persist_in(conn, model)?;
        }
        Ok(())
    }
}

/// Delete models through a repository, deletion checks included
pub struct DeleteAction<M, D> {
    repository: Repository<M>,
    models: Vec<D>,
}

impl<M, D> DeleteAction<M, D> {
    pub fn new(repository: Repository<M>, models: Vec<D>) -> Self {
        Self { repository, models }
    }

    pub fn one(repository: Repository<M>, model: D) -> Self {
        Self::new(repository, vec![model])
    }
}

impl<M, D: fmt::Debug> fmt::Debug for DeleteAction<M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteAction")
            .field("models", &self.models)
            .finish()
    }
}

impl<M, D> Action for DeleteAction<M, D>
where
    D: DeletableModel + fmt::Debug,
{
    fn perform(self: Box<Self>, conn: &Connection) -> Result<()> {
        for model in &self.models {
            self.repository.delete_in(conn, model)?;
        }
        Ok(())
    }
}
