//! Store-specific error constructors

use briventory_core::OrmError;

/// Password hashing or verification failed
pub fn password_error(reason: impl std::fmt::Display) -> OrmError {
    OrmError::Store {
        op: "password_hash",
        message: reason.to_string(),
    }
}
