//! Briventory Core - generic persistence layer
//!
//! Maps domain models onto relational records:
//! - `PersistenceContext`: units of work over a connection, optionally transactional
//! - `Repository<M>`: queries, validation, cascaded persistence, deletion, migration
//! - `Cascade` / `ModelPersistor`: multi-record writes with key propagation
//! - `LazyLoader` family: deferred relations with change detection
//! - `Action`s: side effects attached to persistence and deletion
//! - `RepositoriesHandler`: one shared repository instance per type
//!
//! The storage driver is `rusqlite`; driver errors pass through unchanged.

pub mod action;
pub mod context;
pub mod errors;
pub mod loader;
pub mod logging_facility;
pub mod model;
pub mod persistor;
pub mod query;
pub mod record;
pub mod registry;
pub mod repository;

#[doc(hidden)]
pub use briventory_core_types as __core_types;
#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use action::{
    Action, Actions, DeleteAction, DeleteRecordAction, PersistAction, PersistRecordAction,
};
pub use context::{PersistenceContext, PersistenceContextExt};
pub use errors::{ErrorKind, OrmError, Result};
pub use loader::{LazyLoader, ManyModelsLoader, ModelLoader, OptionalModelLoader, RecordLoader};
pub use model::{DeletableModel, Model, PersistableModel, ValidatableModel, ValidationError};
pub use persistor::{Cascade, ModelPersistor};
pub use query::{Query, SubQuery};
pub use record::UpdatableRecord;
pub use registry::{Injectable, RepositoriesHandler};
pub use repository::Repository;
