use crate::models::ColorSource;
use briventory_core::action::no_actions;
use briventory_core::query::{self, Query};
use briventory_core::{
    Injectable, OptionalModelLoader, RepositoriesHandler, Repository, Result,
};
use rusqlite::{Connection, Row};

const SELECT: &str = "SELECT id, name, url, default_source FROM color_source";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ColorSource> {
    Ok(ColorSource {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        default_source: row.get(3)?,
    })
}

/// Color sources, read-mostly reference data
#[derive(Debug, Clone)]
pub struct ColorSourcesRepository {
    base: Repository<ColorSource>,
}

impl Injectable for ColorSourcesRepository {
    fn inject(handler: &RepositoriesHandler) -> Result<Self> {
        Ok(Self {
            base: Repository::new(handler.context()),
        })
    }
}

impl ColorSourcesRepository {
    pub fn base(&self) -> &Repository<ColorSource> {
        &self.base
    }

    pub fn all(&self) -> Result<Vec<ColorSource>> {
        self.base
            .fetch(&Query::new(format!("{SELECT} ORDER BY name")), map_row)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<ColorSource>> {
        self.base
            .fetch_optional(&Query::new(format!("{SELECT} WHERE id = ?1")).bind(id), map_row)
    }

    /// Lookup on a connection the caller already holds.
    pub fn find_by_id_in(conn: &Connection, id: i64) -> Result<Option<ColorSource>> {
        query::fetch_optional(
            conn,
            &Query::new(format!("{SELECT} WHERE id = ?1")).bind(id),
            map_row,
        )
    }

    /// The source flagged as application default, if any.
    pub fn default_source(&self) -> Result<Option<ColorSource>> {
        self.base.fetch_optional(
            &Query::new(format!("{SELECT} WHERE default_source = 1 ORDER BY id LIMIT 1")),
            map_row,
        )
    }

    pub fn persist(&self, source: &mut ColorSource) -> Result<()> {
        self.base.persist(source)
    }

    pub fn delete(&self, source: &ColorSource) -> Result<()> {
        self.base.delete(source)
    }

    /// Loader of a referenced color source. The reference itself is stored
    /// on the owner, so the loader never writes.
    pub fn optional_loader(&self, key: Option<i64>) -> OptionalModelLoader<i64, ColorSource> {
        self.base.create_optional_model_loader(
            key,
            |conn: &Connection, id: &i64| Self::find_by_id_in(conn, *id),
            no_actions,
        )
    }
}
