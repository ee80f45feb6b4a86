use super::is_blank;
use crate::records::ColorSourceRecord;
use briventory_core::{
    Cascade, DeletableModel, Model, PersistableModel, Result, ValidatableModel, ValidationError,
};
use rusqlite::Connection;

/// Naming authority for part colors, such as BrickLink or Rebrickable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSource {
    pub id: Option<i64>,
    pub name: String,
    pub url: Option<String>,
    /// The application-wide default source.
    pub default_source: bool,
}

impl ColorSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            url: None,
            default_source: false,
        }
    }

    fn record(&self) -> ColorSourceRecord {
        ColorSourceRecord {
            id: self.id,
            name: self.name.clone(),
            url: self.url.clone(),
            default_source: self.default_source,
        }
    }
}

impl From<ColorSourceRecord> for ColorSource {
    fn from(record: ColorSourceRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            url: record.url,
            default_source: record.default_source,
        }
    }
}

impl Model for ColorSource {}

impl ValidatableModel for ColorSource {
    fn validate(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        let mut errors = Vec::new();
        if is_blank(&self.name) {
            errors.push(ValidationError::field("name", "color_source.error.name.empty"));
        }
        if let Some(url) = &self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ValidationError::field("url", "color_source.error.url.invalid"));
            }
        }
        Ok(errors)
    }
}

impl PersistableModel for ColorSource {
    type FinalRecord = ColorSourceRecord;

    fn cascade() -> Cascade<Self, ColorSourceRecord> {
        Cascade::first(|source: &ColorSource, _: &Connection| Ok(source.record()))
    }

    fn refresh(&mut self, record: &ColorSourceRecord) {
        self.id = record.id;
    }
}

impl DeletableModel for ColorSource {
    type DeletionRecord = ColorSourceRecord;

    fn validate_for_deletion(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        if self.default_source {
            return Ok(vec![ValidationError::model(
                "color_source.error.delete.default",
            )]);
        }
        Ok(Vec::new())
    }

    fn deletion_record(&self) -> ColorSourceRecord {
        self.record()
    }
}
