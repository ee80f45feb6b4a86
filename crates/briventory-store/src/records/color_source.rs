use super::{delete_by_key, merge_with_generated_key};
use briventory_core::{Result, UpdatableRecord};
use rusqlite::{params, Connection};

/// Row of `color_source`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSourceRecord {
    pub id: Option<i64>,
    pub name: String,
    pub url: Option<String>,
    pub default_source: bool,
}

impl UpdatableRecord for ColorSourceRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        let id = self.id;
        merge_with_generated_key(
            conn,
            &mut self.id,
            "INSERT INTO color_source (id, name, url, default_source) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 url = excluded.url,
                 default_source = excluded.default_source",
            params![id, self.name, self.url, self.default_source],
        )
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(conn, "DELETE FROM color_source WHERE id = ?1", self.id)
    }
}
