#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use briventory_core::action::{single, Action};
use briventory_core::context::Work;
use briventory_core::query::{self, Query};
use briventory_core::{
    Actions, Cascade, DeletableModel, DeleteRecordAction, Model, OrmError, PersistRecordAction,
    PersistableModel, PersistenceContext, RecordLoader, Repository, Result, UpdatableRecord,
    ValidatableModel, ValidationError,
};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub const SCHEMA: &str = "
    CREATE TABLE widget (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
    CREATE TABLE widget_tag (id_widget INTEGER PRIMARY KEY REFERENCES widget(id) ON DELETE CASCADE);
    CREATE TABLE segment_1 (id INTEGER PRIMARY KEY AUTOINCREMENT, parent INTEGER, label TEXT NOT NULL);
    CREATE TABLE segment_2 (id INTEGER PRIMARY KEY AUTOINCREMENT, parent INTEGER, label TEXT NOT NULL);
    CREATE TABLE segment_3 (id INTEGER PRIMARY KEY AUTOINCREMENT, parent INTEGER, label TEXT NOT NULL);
    CREATE TABLE segment_4 (id INTEGER PRIMARY KEY AUTOINCREMENT, parent INTEGER, label TEXT NOT NULL);
    CREATE TABLE segment_5 (id INTEGER PRIMARY KEY AUTOINCREMENT, parent INTEGER, label TEXT NOT NULL);
    INSERT INTO segment_5 (id, parent, label) VALUES (41, NULL, 'seed');
";

/// Single in-memory connection shared by every unit of work
pub struct MemoryContext {
    conn: Mutex<Connection>,
}

impl MemoryContext {
    pub fn new() -> Arc<Self> {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Arc::new(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    pub fn execute(&self, sql: &str) {
        self.conn.lock().unwrap().execute_batch(sql).unwrap();
    }
}

impl PersistenceContext for MemoryContext {
    fn consume_in_connection(&self, work: &mut Work<'_>) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| OrmError::internal("connection lock poisoned"))?;
        work(&conn)
    }

    fn consume_in_transaction(&self, work: &mut Work<'_>) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| OrmError::internal("connection lock poisoned"))?;
        let tx = conn.transaction()?;
        work(&tx)?;
        tx.commit()?;
        Ok(())
    }
}

pub fn repository<M>(context: &Arc<MemoryContext>) -> Repository<M> {
    let context: Arc<dyn PersistenceContext> = context.clone();
    Repository::new(context)
}

// ========== Widget: one record plus a marker relation ==========

#[derive(Debug, Clone)]
pub struct WidgetRecord {
    pub id: Option<i64>,
    pub name: String,
}

impl UpdatableRecord for WidgetRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        match self.id {
            Some(id) => {
                conn.execute(
                    "INSERT INTO widget (id, name) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                    params![id, self.name],
                )?;
            }
            None => {
                conn.execute("INSERT INTO widget (name) VALUES (?1)", params![self.name])?;
                self.id = Some(conn.last_insert_rowid());
            }
        }
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM widget WHERE id = ?1", params![self.id])?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct TagRecord {
    pub id_widget: i64,
}

impl UpdatableRecord for TagRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO widget_tag (id_widget) VALUES (?1)",
            params![self.id_widget],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "DELETE FROM widget_tag WHERE id_widget = ?1",
            params![self.id_widget],
        )?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct FailingAction;

impl Action for FailingAction {
    fn perform(self: Box<Self>, _conn: &Connection) -> Result<()> {
        Err(OrmError::internal("action failed"))
    }
}

#[derive(Debug)]
pub struct Widget {
    pub id: Option<i64>,
    pub name: String,
    pub tagged: RecordLoader<i64, bool>,
    pub fail_after_write: bool,
}

fn fetch_tagged(conn: &Connection, id: &i64) -> Result<bool> {
    query::exists(
        conn,
        &Query::new("SELECT 1 FROM widget_tag WHERE id_widget = ?1").bind(*id),
    )
}

fn tag_actions(_conn: &Connection, id: &i64, tagged: &bool) -> Result<Actions> {
    let record = TagRecord { id_widget: *id };
    Ok(if *tagged {
        single(PersistRecordAction::new(record))
    } else {
        single(DeleteRecordAction::new(record))
    })
}

impl Widget {
    pub fn new(repository: &Repository<Widget>, name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            tagged: repository.create_record_loader(None, fetch_tagged, tag_actions),
            fail_after_write: false,
        }
    }

    pub fn from_row(repository: &Repository<Widget>, row: &Row<'_>) -> rusqlite::Result<Self> {
        let id: i64 = row.get(0)?;
        Ok(Self {
            id: Some(id),
            name: row.get(1)?,
            tagged: repository.create_record_loader(Some(id), fetch_tagged, tag_actions),
            fail_after_write: false,
        })
    }
}

impl Model for Widget {}

impl ValidatableModel for Widget {
    fn validate(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ValidationError::field("name", "widget.error.name.required"));
        }
        if self.name.len() > 20 {
            errors.push(ValidationError::field("name", "widget.error.name.length").with_argument(20));
        }
        Ok(errors)
    }
}

impl PersistableModel for Widget {
    type FinalRecord = WidgetRecord;

    fn cascade() -> Cascade<Self, WidgetRecord> {
        Cascade::first(|widget: &Widget, _: &Connection| {
            Ok(WidgetRecord {
                id: widget.id,
                name: widget.name.clone(),
            })
        })
    }

    fn refresh(&mut self, record: &WidgetRecord) {
        self.id = record.id;
        if let Some(id) = record.id {
            self.tagged.adopt_key(id);
        }
    }

    fn post_persistence_actions(&self, conn: &Connection) -> Result<Actions> {
        let mut actions = self.tagged.create_actions(conn)?;
        if self.fail_after_write {
            actions.extend(single(FailingAction));
        }
        Ok(actions)
    }

    fn mark_persisted(&mut self) {
        self.tagged.mark_persisted();
    }
}

impl DeletableModel for Widget {
    type DeletionRecord = WidgetRecord;

    fn validate_for_deletion(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        if self.name.starts_with("keep") {
            return Ok(vec![ValidationError::model("widget.error.delete.protected")]);
        }
        Ok(Vec::new())
    }

    fn deletion_record(&self) -> WidgetRecord {
        WidgetRecord {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

// ========== Pipeline: five chained records ==========

#[derive(Debug)]
pub struct SegmentRecord {
    pub table: &'static str,
    pub id: Option<i64>,
    pub parent: Option<i64>,
    pub label: String,
}

impl SegmentRecord {
    pub fn new(table: &'static str, parent: Option<i64>, label: &str) -> Self {
        Self {
            table,
            id: None,
            parent,
            label: label.to_string(),
        }
    }
}

impl UpdatableRecord for SegmentRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!("INSERT INTO {} (parent, label) VALUES (?1, ?2)", self.table),
            params![self.parent, self.label],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            params![self.id],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Pipeline {
    pub id: Option<i64>,
    pub label: String,
    /// Keys generated by the intermediate steps, in order.
    pub trail: Vec<i64>,
}

impl Model for Pipeline {}

impl ValidatableModel for Pipeline {}

fn segment(
    table: &'static str,
) -> impl Fn(&Pipeline, &SegmentRecord, &Connection) -> Result<SegmentRecord> {
    move |pipeline: &Pipeline, previous: &SegmentRecord, _: &Connection| {
        Ok(SegmentRecord::new(table, previous.id, &pipeline.label))
    }
}

fn record_trail(pipeline: &mut Pipeline, record: &SegmentRecord) {
    pipeline.trail.extend(record.id);
}

impl PersistableModel for Pipeline {
    type FinalRecord = SegmentRecord;

    fn cascade() -> Cascade<Self, SegmentRecord> {
        Cascade::first(|pipeline: &Pipeline, _: &Connection| {
            Ok(SegmentRecord::new("segment_1", None, &pipeline.label))
        })
        .refresh_with(record_trail)
        .then(segment("segment_2"))
        .refresh_with(record_trail)
        .then(segment("segment_3"))
        .refresh_with(record_trail)
        .then(segment("segment_4"))
        .refresh_with(record_trail)
        .then(segment("segment_5"))
    }

    fn refresh(&mut self, record: &SegmentRecord) {
        self.id = record.id;
    }
}
