use super::is_blank;
use crate::records::ContainerTypeRecord;
use briventory_core::query::{self, Query};
use briventory_core::{
    Cascade, DeletableModel, Model, PersistableModel, Result, ValidatableModel, ValidationError,
};
use rusqlite::Connection;

/// Kind of container, bounding how many lockers it is divided into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerType {
    pub id: Option<i64>,
    pub name: String,
    pub min_lockers: u16,
    pub max_lockers: u16,
    /// Format of locker labels, `{}` standing for the locker order.
    pub numbering_format: String,
}

impl ContainerType {
    pub fn new(name: impl Into<String>, min_lockers: u16, max_lockers: u16) -> Self {
        Self {
            id: None,
            name: name.into(),
            min_lockers,
            max_lockers,
            numbering_format: "{}".to_string(),
        }
    }

    /// Label of the locker at `order`.
    pub fn locker_label(&self, order: u16) -> String {
        self.numbering_format.replace("{}", &order.to_string())
    }

    fn record(&self) -> ContainerTypeRecord {
        ContainerTypeRecord {
            id: self.id,
            name: self.name.clone(),
            min_lockers: self.min_lockers,
            max_lockers: self.max_lockers,
            numbering_format: self.numbering_format.clone(),
        }
    }
}

impl From<ContainerTypeRecord> for ContainerType {
    fn from(record: ContainerTypeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            min_lockers: record.min_lockers,
            max_lockers: record.max_lockers,
            numbering_format: record.numbering_format,
        }
    }
}

impl Model for ContainerType {}

impl ValidatableModel for ContainerType {
    fn validate(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        let mut errors = Vec::new();
        if is_blank(&self.name) {
            errors.push(ValidationError::field("name", "container_type.error.name.empty"));
        }
        if self.min_lockers > self.max_lockers {
            errors.push(
                ValidationError::field("max_lockers", "container_type.error.lockers.range")
                    .with_argument(self.min_lockers)
                    .with_argument(self.max_lockers),
            );
        }
        if !self.numbering_format.contains("{}") {
            errors.push(ValidationError::field(
                "numbering_format",
                "container_type.error.numbering_format.placeholder",
            ));
        }
        Ok(errors)
    }
}

impl PersistableModel for ContainerType {
    type FinalRecord = ContainerTypeRecord;

    fn cascade() -> Cascade<Self, ContainerTypeRecord> {
        Cascade::first(|container_type: &ContainerType, _: &Connection| {
            Ok(container_type.record())
        })
    }

    fn refresh(&mut self, record: &ContainerTypeRecord) {
        self.id = record.id;
    }
}

impl DeletableModel for ContainerType {
    type DeletionRecord = ContainerTypeRecord;

    fn validate_for_deletion(&self, conn: &Connection) -> Result<Vec<ValidationError>> {
        let in_use: i64 = query::fetch_single(
            conn,
            &Query::new("SELECT COUNT(*) FROM container WHERE id_container_type = ?1").bind(self.id),
            |row| row.get(0),
        )?;
        if in_use > 0 {
            return Ok(vec![
                ValidationError::model("container_type.error.delete.in_use").with_argument(in_use)
            ]);
        }
        Ok(Vec::new())
    }

    fn deletion_record(&self) -> ContainerTypeRecord {
        self.record()
    }
}
