use crate::model::ValidationError;
use thiserror::Error;

/// Result type alias using OrmError
pub type Result<T> = std::result::Result<T, OrmError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in logs and by callers that
/// need to branch on the failure class without matching on variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Model validation
    PersistenceRejected,
    DeletionRejected,

    // Query cardinality
    NoDataFound,
    TooManyRows,

    // Cascade
    MissingKey,

    // Registry
    RepositoryUnavailable,

    // Storage
    Store,
    Driver,

    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::PersistenceRejected => "ERR_PERSISTENCE_REJECTED",
            ErrorKind::DeletionRejected => "ERR_DELETION_REJECTED",
            ErrorKind::NoDataFound => "ERR_NO_DATA_FOUND",
            ErrorKind::TooManyRows => "ERR_TOO_MANY_ROWS",
            ErrorKind::MissingKey => "ERR_MISSING_KEY",
            ErrorKind::RepositoryUnavailable => "ERR_REPOSITORY_UNAVAILABLE",
            ErrorKind::Store => "ERR_STORE",
            ErrorKind::Driver => "ERR_DRIVER",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Errors surfaced by the persistence core
#[derive(Debug, Error)]
pub enum OrmError {
    /// A model failed validation; nothing was written.
    #[error("Persistence of {model} rejected with {} validation error(s)", .errors.len())]
    Persistence {
        model: &'static str,
        errors: Vec<ValidationError>,
    },

    /// A model failed deletion checks; nothing was removed.
    ///
    /// `position` is the index of the rejected model when it was part of a batch.
    #[error("Deletion of {model} rejected{}", .position.map(|p| format!(" at batch position {p}")).unwrap_or_default())]
    Deletion {
        model: &'static str,
        position: Option<usize>,
        errors: Vec<ValidationError>,
    },

    #[error("Query returned no rows where exactly one was expected")]
    NoDataFound,

    #[error("Query returned more than one row where at most one was expected")]
    TooManyRows,

    #[error("Record {record} has no key after merge")]
    MissingKey { record: &'static str },

    #[error("Repository {repository} could not be instantiated: {message}")]
    RepositoryUnavailable {
        repository: &'static str,
        message: String,
    },

    #[error("Store operation {op} failed: {message}")]
    Store { op: &'static str, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Driver failures pass through unmodified.
    #[error(transparent)]
    Driver(#[from] rusqlite::Error),
}

impl OrmError {
    pub fn persistence(model: &'static str, errors: Vec<ValidationError>) -> Self {
        OrmError::Persistence { model, errors }
    }

    pub fn deletion(
        model: &'static str,
        position: Option<usize>,
        errors: Vec<ValidationError>,
    ) -> Self {
        OrmError::Deletion {
            model,
            position,
            errors,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        OrmError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OrmError::Persistence { .. } => ErrorKind::PersistenceRejected,
            OrmError::Deletion { .. } => ErrorKind::DeletionRejected,
            OrmError::NoDataFound => ErrorKind::NoDataFound,
            OrmError::TooManyRows => ErrorKind::TooManyRows,
            OrmError::MissingKey { .. } => ErrorKind::MissingKey,
            OrmError::RepositoryUnavailable { .. } => ErrorKind::RepositoryUnavailable,
            OrmError::Store { .. } => ErrorKind::Store,
            OrmError::Internal { .. } => ErrorKind::Internal,
            OrmError::Driver(_) => ErrorKind::Driver,
        }
    }

    /// Stable error code, shorthand for `self.kind().code()`
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// The model type named by a validation failure
    pub fn model(&self) -> Option<&'static str> {
        match self {
            OrmError::Persistence { model, .. } | OrmError::Deletion { model, .. } => Some(model),
            _ => None,
        }
    }

    /// The validation errors carried by a persistence or deletion failure
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            OrmError::Persistence { errors, .. } | OrmError::Deletion { errors, .. } => errors,
            _ => &[],
        }
    }
}
