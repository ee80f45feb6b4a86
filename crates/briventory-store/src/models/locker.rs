use crate::records::LockerRecord;
use briventory_core::{
    Cascade, DeletableModel, Model, PersistableModel, Result, ValidatableModel, ValidationError,
};
use rusqlite::Connection;

/// One compartment of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locker {
    pub id: Option<i64>,
    /// The owning container; set when the locker is attached to it.
    pub id_container: Option<i64>,
    /// Position of the locker inside its container.
    pub order: u16,
    /// Holds parts of one design regardless of color.
    pub color_mixed: bool,
}

impl Locker {
    pub fn new(order: u16) -> Self {
        Self {
            id: None,
            id_container: None,
            order,
            color_mixed: false,
        }
    }

    fn record(&self) -> LockerRecord {
        LockerRecord {
            id: self.id,
            id_container: self.id_container,
            order: self.order,
            color_mixed: self.color_mixed,
        }
    }
}

impl From<LockerRecord> for Locker {
    fn from(record: LockerRecord) -> Self {
        Self {
            id: record.id,
            id_container: record.id_container,
            order: record.order,
            color_mixed: record.color_mixed,
        }
    }
}

impl Model for Locker {}

impl ValidatableModel for Locker {
    fn validate(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        if self.id_container.is_none() {
            return Ok(vec![ValidationError::field(
                "id_container",
                "locker.error.container.missing",
            )]);
        }
        Ok(Vec::new())
    }
}

impl PersistableModel for Locker {
    type FinalRecord = LockerRecord;

    fn cascade() -> Cascade<Self, LockerRecord> {
        Cascade::first(|locker: &Locker, _: &Connection| Ok(locker.record()))
    }

    fn refresh(&mut self, record: &LockerRecord) {
        self.id = record.id;
    }
}

impl DeletableModel for Locker {
    type DeletionRecord = LockerRecord;

    fn deletion_record(&self) -> LockerRecord {
        self.record()
    }
}
