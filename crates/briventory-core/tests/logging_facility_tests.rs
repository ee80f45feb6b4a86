// Integration tests for lifecycle logging of repository operations

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use briventory_core::logging_facility::init_test_capture;
use briventory_core::{log_op_end, log_op_error, log_op_start, OrmError};
use common::{repository, MemoryContext, Widget};

#[test]
fn test_macros_emit_canonical_fields() {
    let capture = init_test_capture();

    log_op_start!("widget_save", model = "Widget");
    log_op_end!("widget_save", duration_ms = 7_u64);

    let start = capture.find("widget_save", "start");
    assert_eq!(start[0].field("model"), Some("Widget"));
    assert!(start[0].field("component").unwrap().contains("logging_facility_tests"));
    let end = capture.find("widget_save", "end");
    assert_eq!(end[0].field("duration_ms"), Some("7"));
}

#[test]
fn test_error_macro_records_kind_and_code() {
    let capture = init_test_capture();
    let err = OrmError::TooManyRows;

    log_op_error!("widget_drop", &err, duration_ms = 1_u64);

    let events = capture.find("widget_drop", "end_error");
    assert_eq!(events[0].field("err.code"), Some("ERR_TOO_MANY_ROWS"));
    assert_eq!(events[0].field("err.kind"), Some("TooManyRows"));
}

#[test]
fn test_persist_logs_start_and_end() {
    let capture = init_test_capture();
    let context = MemoryContext::new();
    let repo = repository::<Widget>(&context);
    let mut widget = Widget::new(&repo, "logged");

    repo.persist(&mut widget).unwrap();

    capture.assert_event_exists("persist", "start");
    capture.assert_event_exists("persist", "end");
}

#[test]
fn test_rejected_persist_logs_error_code() {
    let capture = init_test_capture();
    let context = MemoryContext::new();
    let repo = repository::<Widget>(&context);
    let mut widget = Widget::new(&repo, "");

    repo.persist(&mut widget).unwrap_err();

    let errors = capture.find("persist", "end_error");
    assert!(errors
        .iter()
        .any(|e| e.field("err.code") == Some("ERR_PERSISTENCE_REJECTED")));
}
