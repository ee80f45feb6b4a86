//! Multi-record persistence cascade
//!
//! A model spanning several tables is written as a chain of records: each
//! step builds its record from the model and the previously merged record,
//! merges it, then optionally lets the model absorb generated keys before
//! the next step runs.
//!
//! ```ignore
//! Cascade::first(|c: &Container, _: &Connection| Ok(c.container_record()))
//!     .refresh_with(|c, record| c.id = record.id)
//!     .then(|c, base, _| Ok(c.private_record(base.id)))
//! ```

use crate::action::perform_all;
use crate::errors::Result;
use crate::model::PersistableModel;
use crate::record::UpdatableRecord;
use rusqlite::Connection;

type Step<P, R> = Box<dyn Fn(&mut P, &Connection) -> Result<R>>;

/// Ordered chain of record writes ending in a record of type `R`
pub struct Cascade<P, R> {
    run: Step<P, R>,
    arity: usize,
}

impl<P: 'static, R: UpdatableRecord + 'static> Cascade<P, R> {
    /// Start a cascade with its first record.
    pub fn first<B>(build: B) -> Self
    where
        B: Fn(&P, &Connection) -> Result<R> + 'static,
    {
        Cascade {
            run: Box::new(move |model: &mut P, conn: &Connection| {
                let mut record = build(&*model, conn)?;
                record.merge(conn)?;
                tracing::debug!(record = ?record, step = 1, "merged cascade record");
                Ok(record)
            }),
            arity: 1,
        }
    }

    /// Let the model absorb the record merged by the latest step before the
    /// next step is built.
    pub fn refresh_with<F>(self, refresh: F) -> Self
    where
        F: Fn(&mut P, &R) + 'static,
    {
        let run = self.run;
        Cascade {
            run: Box::new(move |model: &mut P, conn: &Connection| {
                let record = run(model, conn)?;
                refresh(model, &record);
                Ok(record)
            }),
            arity: self.arity,
        }
    }

    /// Append a record built from the model and the previous merged record.
    pub fn then<R2, B>(self, build: B) -> Cascade<P, R2>
    where
        R2: UpdatableRecord + 'static,
        B: Fn(&P, &R, &Connection) -> Result<R2> + 'static,
    {
        let previous = self.run;
        let step = self.arity + 1;
        Cascade {
            run: Box::new(move |model: &mut P, conn: &Connection| {
                let merged = previous(model, conn)?;
                let mut record = build(&*model, &merged, conn)?;
                record.merge(conn)?;
                tracing::debug!(record = ?record, step, "merged cascade record");
                Ok(record)
            }),
            arity: step,
        }
    }

    /// Number of records written by the cascade.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Write every record in order and return the final merged record.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step and returns its error.
    pub fn execute(&self, model: &mut P, conn: &Connection) -> Result<R> {
        (self.run)(model, conn)
    }
}

/// Writes one model: pre-actions, cascade, final refresh, post-actions,
/// then lets the model mark its loaders persisted
pub struct ModelPersistor<'m, P: PersistableModel> {
    model: &'m mut P,
}

impl<'m, P: PersistableModel> ModelPersistor<'m, P> {
    /// Factory selecting the cascade declared by the model type.
    pub fn of(model: &'m mut P) -> Self {
        Self { model }
    }

    /// Run the cascade and refresh the model from its final record.
    ///
    /// # Errors
    ///
    /// Returns the first failing record write.
    pub fn persist_and_refresh(&mut self, conn: &Connection) -> Result<()> {
        let cascade = P::cascade();
        let last = cascade.execute(self.model, conn)?;
        self.model.refresh(&last);
        Ok(())
    }

    /// Full write pipeline, without validation.
    ///
    /// # Errors
    ///
    /// Returns the first failing action or record write.
    pub fn persist(mut self, conn: &Connection) -> Result<()> {
        perform_all(self.model.pre_persistence_actions(conn)?, conn)?;
        self.persist_and_refresh(conn)?;
        perform_all(self.model.post_persistence_actions(conn)?, conn)?;
        self.model.mark_persisted();
        Ok(())
    }
}
