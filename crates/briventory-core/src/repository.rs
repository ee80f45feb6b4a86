//! Generic repository
//!
//! `Repository<M>` is the entry point for reading models of type `M` and
//! for validating, persisting, deleting and migrating any model. Every
//! public operation opens its own unit of work; the `*_in` variants run on
//! a connection the caller already holds, which is how nested models are
//! written inside their owner's transaction.

use crate::action::{perform_all, Actions};
use crate::context::{PersistenceContext, PersistenceContextExt};
use crate::errors::{OrmError, Result};
use crate::loader::{LazyLoader, ManyModelsLoader, ModelLoader, OptionalModelLoader, RecordLoader};
use crate::model::{DeletableModel, PersistableModel, ValidatableModel, ValidationError};
use crate::persistor::ModelPersistor;
use crate::query::{self, Query, SubQuery};
use crate::record::UpdatableRecord;
use crate::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, Row};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

pub struct Repository<M> {
    context: Arc<dyn PersistenceContext>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Repository<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("model", &std::any::type_name::<M>())
            .finish()
    }
}

fn finish<T>(op: &'static str, model: &'static str, start: Instant, result: Result<T>) -> Result<T> {
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms, model = model);
        }
        Err(err) => {
            log_op_error!(op, err, duration_ms = duration_ms, model = model);
        }
    }
    result
}

impl<M> Repository<M> {
    pub fn new(context: Arc<dyn PersistenceContext>) -> Self {
        Self {
            context,
            _model: PhantomData,
        }
    }

    pub fn context(&self) -> &Arc<dyn PersistenceContext> {
        &self.context
    }

    // ========== Queries ==========

    /// # Errors
    ///
    /// Returns the driver error unchanged.
    pub fn fetch<F>(&self, query: &Query, mapper: F) -> Result<Vec<M>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<M>,
    {
        self.context
            .produce_in_connection(|conn: &Connection| query::fetch(conn, query, mapper))
    }

    /// At most one model.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::TooManyRows`] when the query yields several rows.
    pub fn fetch_optional<F>(&self, query: &Query, mapper: F) -> Result<Option<M>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<M>,
    {
        self.context.produce_in_connection(|conn: &Connection| {
            query::fetch_optional(conn, query, mapper)
        })
    }

    /// Exactly one model.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NoDataFound`] or [`OrmError::TooManyRows`] when the
    /// query does not yield exactly one row.
    pub fn fetch_single<F>(&self, query: &Query, mapper: F) -> Result<M>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<M>,
    {
        self.fetch_single_into(query, mapper)
    }

    /// Exactly one value of an arbitrary type, such as a count.
    ///
    /// # Errors
    ///
    /// Same cardinality errors as [`fetch_single`](Self::fetch_single).
    pub fn fetch_single_into<T, F>(&self, query: &Query, mapper: F) -> Result<T>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.context
            .produce_in_connection(|conn: &Connection| query::fetch_single(conn, query, mapper))
    }

    /// # Errors
    ///
    /// Returns the driver error unchanged.
    pub fn exists(&self, query: &Query) -> Result<bool> {
        self.context
            .produce_in_connection(|conn: &Connection| query::exists(conn, query))
    }

    /// Run several queries, each mapped into `M`, as one consistent read.
    ///
    /// # Errors
    ///
    /// Returns the first failing branch's error.
    pub fn union_all(&self, queries: Vec<SubQuery<'_, M>>) -> Result<Vec<M>> {
        let model = std::any::type_name::<M>();
        log_op_start!("union_all", model = model, batch_len = queries.len());
        let start = Instant::now();
        let result = self
            .context
            .produce_in_transaction(|conn: &Connection| query::union_all(conn, queries));
        finish("union_all", model, start, result)
    }

    // ========== Validation and persistence ==========

    /// # Errors
    ///
    /// Returns a driver error raised by a validation query.
    pub fn validate<V: ValidatableModel>(&self, model: &V) -> Result<Vec<ValidationError>> {
        self.context
            .produce_in_connection(|conn: &Connection| model.validate(conn))
    }

    /// Validate and write one model in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Persistence`] carrying the validation errors when
    /// the model is invalid; nothing is written in that case. Any other
    /// failure rolls the whole write back.
    pub fn persist<P>(&self, model: &mut P) -> Result<()>
    where
        P: PersistableModel + ValidatableModel,
    {
        log_op_start!("persist", model = P::model_name());
        let start = Instant::now();
        let result = self
            .context
            .produce_in_transaction(|conn: &Connection| self.persist_in(conn, model));
        finish("persist", P::model_name(), start, result)
    }

    /// Validate and write several models in one transaction.
    ///
    /// # Errors
    ///
    /// Stops at the first invalid model or failing write and rolls back.
    pub fn persist_all<P>(&self, models: &mut [P]) -> Result<()>
    where
        P: PersistableModel + ValidatableModel,
    {
        log_op_start!("persist_all", model = P::model_name(), batch_len = models.len());
        let start = Instant::now();
        let result = self.context.produce_in_transaction(|conn: &Connection| {
            for model in models.iter_mut() {
                self.persist_in(conn, model)?;
            }
            Ok(())
        });
        finish("persist_all", P::model_name(), start, result)
    }

    /// Validate and write one model inside the caller's unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Persistence`] when the model is invalid.
    pub fn persist_in<P>(&self, conn: &Connection, model: &mut P) -> Result<()>
    where
        P: PersistableModel + ValidatableModel,
    {
        let errors = model.validate(conn)?;
        if !errors.is_empty() {
            tracing::debug!(model = P::model_name(), errors = errors.len(), "validation failed");
            return Err(OrmError::persistence(P::model_name(), errors));
        }
        ModelPersistor::of(model).persist(conn)
    }

    /// Replace a stored representation with `model` in one transaction.
    ///
    /// `record_to_delete` selects the record of the old representation; it
    /// is removed before the new model's cascade runs, so the model may
    /// reuse keys shared with the old representation.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Persistence`] when the new model is invalid. Any
    /// failure leaves the old representation in place.
    pub fn migrate<P, R, S>(&self, record_to_delete: S, model: &mut P) -> Result<()>
    where
        P: PersistableModel + ValidatableModel,
        R: UpdatableRecord,
        S: FnOnce(&Connection) -> Result<R>,
    {
        log_op_start!("migrate", model = P::model_name());
        let start = Instant::now();
        let result = self.context.produce_in_transaction(|conn: &Connection| {
            let errors = model.validate(conn)?;
            if !errors.is_empty() {
                return Err(OrmError::persistence(P::model_name(), errors));
            }
            let old = record_to_delete(conn)?;
            tracing::debug!(record = ?old, "removing migrated record");
            old.delete(conn)?;
            ModelPersistor::of(model).persist(conn)
        });
        finish("migrate", P::model_name(), start, result)
    }

    // ========== Deletion ==========

    /// # Errors
    ///
    /// Returns [`OrmError::Deletion`] when the model refuses deletion;
    /// nothing is removed in that case.
    pub fn delete<D: DeletableModel>(&self, model: &D) -> Result<()> {
        log_op_start!("delete", model = D::model_name());
        let start = Instant::now();
        let result = self
            .context
            .produce_in_transaction(|conn: &Connection| delete_at(conn, model, None));
        finish("delete", D::model_name(), start, result)
    }

    /// Delete several models in one transaction.
    ///
    /// # Errors
    ///
    /// The first refused model aborts the batch; its index is reported as
    /// the error's `position` and no model of the batch is removed.
    pub fn delete_all<D: DeletableModel>(&self, models: &[D]) -> Result<()> {
        log_op_start!("delete_all", model = D::model_name(), batch_len = models.len());
        let start = Instant::now();
        let result = self.context.produce_in_transaction(|conn: &Connection| {
            for (position, model) in models.iter().enumerate() {
                delete_at(conn, model, Some(position))?;
            }
            Ok(())
        });
        finish("delete_all", D::model_name(), start, result)
    }

    /// # Errors
    ///
    /// Returns [`OrmError::Deletion`] when the model refuses deletion.
    pub fn delete_in<D: DeletableModel>(&self, conn: &Connection, model: &D) -> Result<()> {
        delete_at(conn, model, None)
    }

    // ========== Loader factories ==========

    pub fn create_model_loader<K, F, A>(
        &self,
        key: Option<K>,
        fetcher: F,
        actions_creator: A,
    ) -> ModelLoader<K, M>
    where
        K: PartialEq,
        M: Clone + PartialEq,
        F: Fn(&Connection, &K) -> Result<M> + Send + Sync + 'static,
        A: Fn(&Connection, &K, &M) -> Result<Actions> + Send + Sync + 'static,
    {
        LazyLoader::new(Arc::clone(&self.context), key, fetcher, actions_creator)
    }

    pub fn create_optional_model_loader<K, F, A>(
        &self,
        key: Option<K>,
        fetcher: F,
        actions_creator: A,
    ) -> OptionalModelLoader<K, M>
    where
        K: PartialEq,
        M: Clone + PartialEq,
        F: Fn(&Connection, &K) -> Result<Option<M>> + Send + Sync + 'static,
        A: Fn(&Connection, &K, &Option<M>) -> Result<Actions> + Send + Sync + 'static,
    {
        LazyLoader::new(Arc::clone(&self.context), key, fetcher, actions_creator)
    }

    pub fn create_many_models_loader<K, F, A>(
        &self,
        key: Option<K>,
        fetcher: F,
        actions_creator: A,
    ) -> ManyModelsLoader<K, M>
    where
        K: PartialEq,
        M: Clone + PartialEq,
        F: Fn(&Connection, &K) -> Result<Vec<M>> + Send + Sync + 'static,
        A: Fn(&Connection, &K, &Vec<M>) -> Result<Actions> + Send + Sync + 'static,
    {
        LazyLoader::new(Arc::clone(&self.context), key, fetcher, actions_creator)
    }

    pub fn create_record_loader<K, V, F, A>(
        &self,
        key: Option<K>,
        fetcher: F,
        actions_creator: A,
    ) -> RecordLoader<K, V>
    where
        K: PartialEq,
        V: Clone + PartialEq,
        F: Fn(&Connection, &K) -> Result<V> + Send + Sync + 'static,
        A: Fn(&Connection, &K, &V) -> Result<Actions> + Send + Sync + 'static,
    {
        LazyLoader::new(Arc::clone(&self.context), key, fetcher, actions_creator)
    }
}

fn delete_at<D: DeletableModel>(conn: &Connection, model: &D, position: Option<usize>) -> Result<()> {
    if !model.shall_delete(conn)? {
        return Err(OrmError::deletion(
            D::model_name(),
            position,
            vec![ValidationError::model("orm.error.deletion.not_allowed")],
        ));
    }
    let errors = model.validate_for_deletion(conn)?;
    if !errors.is_empty() {
        tracing::debug!(model = D::model_name(), errors = errors.len(), "deletion refused");
        return Err(OrmError::deletion(D::model_name(), position, errors));
    }
    perform_all(model.pre_deletion_actions(conn)?, conn)?;
    model.deletion_record().delete(conn)?;
    perform_all(model.post_deletion_actions(conn)?, conn)
}
