//! Canonical logging macros

/// Log the start of an operation
///
/// ```
/// # use briventory_core::log_op_start;
/// log_op_start!("persist");
/// log_op_start!("persist", model = "Account");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__core_types::schema::EVENT_START,
        )
    };
    ($op:expr, $($field:tt)*) => {
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__core_types::schema::EVENT_START,
            $($field)*
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use briventory_core::log_op_end;
/// log_op_end!("persist", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__core_types::schema::EVENT_END,
            duration_ms = $duration,
        )
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        )
    };
}

/// Log an operation error with its kind and stable code
///
/// `$err` must be a reference to an `OrmError`.
///
/// ```
/// # use briventory_core::{log_op_error, OrmError};
/// let err = OrmError::NoDataFound;
/// log_op_error!("fetch_single", &err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let err: &$crate::OrmError = $err;
        $crate::__tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::__core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?err.kind(),
            err.code = err.code(),
            error = %err,
        )
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let err: &$crate::OrmError = $err;
        $crate::__tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::__core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?err.kind(),
            err.code = err.code(),
            error = %err,
            $($field)*
        )
    }};
}
