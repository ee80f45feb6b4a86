// Integration tests for multi-record cascades and the ModelPersistor

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use briventory_core::{Cascade, ModelPersistor, PersistableModel, PersistenceContextExt};
use common::{repository, MemoryContext, Pipeline, SegmentRecord};
use rusqlite::Connection;

#[test]
fn test_five_record_cascade_takes_identity_from_last_record() {
    // Given: a pipeline model spanning five tables
    let context = MemoryContext::new();
    let repo = repository::<Pipeline>(&context);
    let mut pipeline = Pipeline {
        label: "assembly".to_string(),
        ..Pipeline::default()
    };
    assert_eq!(Pipeline::cascade().arity(), 5);

    // When: it is persisted
    repo.persist(&mut pipeline).unwrap();

    // Then: every table received one row and the model's id is the last key
    for table in ["segment_1", "segment_2", "segment_3", "segment_4"] {
        assert_eq!(context.count(table), 1, "{table} should hold one row");
    }
    assert_eq!(context.count("segment_5"), 2);
    assert_eq!(pipeline.id, Some(42));
    assert_eq!(pipeline.trail, vec![1, 1, 1, 1]);
}

#[test]
fn test_each_step_receives_previous_merged_record() {
    let context = MemoryContext::new();
    let repo = repository::<Pipeline>(&context);
    let mut pipeline = Pipeline {
        label: "linked".to_string(),
        ..Pipeline::default()
    };

    repo.persist(&mut pipeline).unwrap();

    let parent: Option<i64> = repo
        .fetch_single_into(
            &briventory_core::Query::new("SELECT parent FROM segment_5 WHERE id = ?1").bind(42_i64),
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(parent, Some(1));
}

#[test]
fn test_three_record_cascade_executes_in_order() {
    // Given: an ad hoc cascade over three tables
    let context = MemoryContext::new();
    let cascade = Cascade::first(|p: &Pipeline, _: &Connection| {
        Ok(SegmentRecord::new("segment_1", None, &p.label))
    })
    .then(|p: &Pipeline, prev: &SegmentRecord, _: &Connection| {
        Ok(SegmentRecord::new("segment_2", prev.id, &p.label))
    })
    .then(|p: &Pipeline, prev: &SegmentRecord, _: &Connection| {
        Ok(SegmentRecord::new("segment_3", prev.id, &p.label))
    });
    assert_eq!(cascade.arity(), 3);

    // When: it runs inside a transaction
    let mut pipeline = Pipeline::default();
    let last = context
        .produce_in_transaction(|conn: &Connection| cascade.execute(&mut pipeline, conn))
        .unwrap();

    // Then: the final record is the third one
    assert_eq!(last.table, "segment_3");
    assert_eq!(last.parent, Some(1));
    assert_eq!(context.count("segment_4"), 0);
}

#[test]
fn test_failing_step_rolls_back_earlier_records() {
    // Given: a cascade whose second record targets a missing table
    let context = MemoryContext::new();
    let cascade = Cascade::first(|p: &Pipeline, _: &Connection| {
        Ok(SegmentRecord::new("segment_1", None, &p.label))
    })
    .then(|p: &Pipeline, prev: &SegmentRecord, _: &Connection| {
        Ok(SegmentRecord::new("segment_missing", prev.id, &p.label))
    });

    // When: it runs inside a transaction
    let mut pipeline = Pipeline::default();
    let result = context
        .produce_in_transaction(|conn: &Connection| cascade.execute(&mut pipeline, conn));

    // Then: the driver error surfaces and the first record is gone
    assert!(matches!(result, Err(briventory_core::OrmError::Driver(_))));
    assert_eq!(context.count("segment_1"), 0);
}

#[test]
fn test_model_persistor_skips_validation() {
    let context = MemoryContext::new();
    let repo = repository::<common::Widget>(&context);
    let mut widget = common::Widget::new(&repo, "");

    context
        .produce_in_transaction(|conn: &Connection| ModelPersistor::of(&mut widget).persist(conn))
        .unwrap();

    assert!(widget.id.is_some());
    assert_eq!(context.count("widget"), 1);
}
