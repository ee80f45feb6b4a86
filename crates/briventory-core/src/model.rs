//! Capability traits implemented by domain models
//!
//! A model opts into behaviour by implementing the matching trait:
//! `ValidatableModel` to be checked before writes, `PersistableModel` to be
//! written through a record cascade, `DeletableModel` to be removed.

use crate::action::Actions;
use crate::errors::Result;
use crate::persistor::Cascade;
use crate::record::UpdatableRecord;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// A domain object managed by a repository
pub trait Model {
    /// Name reported by validation failures.
    fn model_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

/// One validation finding, localizable by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Offending field, absent for model-level findings.
    pub field: Option<String>,
    pub message_key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message_key: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message_key: message_key.into(),
            arguments: Vec::new(),
        }
    }

    pub fn model(message_key: impl Into<String>) -> Self {
        Self {
            field: None,
            message_key: message_key.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: impl ToString) -> Self {
        self.arguments.push(argument.to_string());
        self
    }
}

pub trait ValidatableModel: Model {
    /// Check the model against the current state of the store.
    ///
    /// An empty list means the model may be written.
    ///
    /// # Errors
    ///
    /// Returns a driver error when a validation query fails.
    fn validate(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        Ok(Vec::new())
    }
}

/// A model written as an ordered cascade of physical records
///
/// The externally visible identity of the model is taken from the last
/// record of the cascade, see [`PersistableModel::refresh`].
pub trait PersistableModel: Model + Sized + 'static {
    type FinalRecord: UpdatableRecord + 'static;

    fn cascade() -> Cascade<Self, Self::FinalRecord>;

    /// Absorb the state of the final merged record, generated keys included.
    fn refresh(&mut self, record: &Self::FinalRecord);

    /// # Errors
    ///
    /// Returns a driver error when building the actions requires a read.
    fn pre_persistence_actions(&self, _conn: &Connection) -> Result<Actions> {
        Ok(Vec::new())
    }

    /// # Errors
    ///
    /// Returns a driver error when building the actions requires a read.
    fn post_persistence_actions(&self, _conn: &Connection) -> Result<Actions> {
        Ok(Vec::new())
    }

    /// Called once the cascade and the post-persistence actions succeeded.
    ///
    /// Models owning loaders mark them persisted here so that the next
    /// write compares against what was just stored.
    fn mark_persisted(&mut self) {}
}

pub trait DeletableModel: Model + Sized + 'static {
    type DeletionRecord: UpdatableRecord;

    /// Coarse switch consulted before the detailed deletion checks.
    ///
    /// # Errors
    ///
    /// Returns a driver error when the decision requires a failing read.
    fn shall_delete(&self, _conn: &Connection) -> Result<bool> {
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns a driver error when a validation query fails.
    fn validate_for_deletion(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        Ok(Vec::new())
    }

    /// The record whose removal deletes the model.
    fn deletion_record(&self) -> Self::DeletionRecord;

    /// # Errors
    ///
    /// Returns a driver error when building the actions requires a read.
    fn pre_deletion_actions(&self, _conn: &Connection) -> Result<Actions> {
        Ok(Vec::new())
    }

    /// # Errors
    ///
    /// Returns a driver error when building the actions requires a read.
    fn post_deletion_actions(&self, _conn: &Connection) -> Result<Actions> {
        Ok(Vec::new())
    }
}
