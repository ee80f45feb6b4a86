use super::{delete_by_key, merge_with_generated_key};
use briventory_core::{OrmError, Result, UpdatableRecord};
use rusqlite::{params, Connection};

/// Row of `container_type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTypeRecord {
    pub id: Option<i64>,
    pub name: String,
    pub min_lockers: u16,
    pub max_lockers: u16,
    pub numbering_format: String,
}

impl UpdatableRecord for ContainerTypeRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        let id = self.id;
        merge_with_generated_key(
            conn,
            &mut self.id,
            "INSERT INTO container_type (id, name, min_lockers, max_lockers, numbering_format)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 min_lockers = excluded.min_lockers,
                 max_lockers = excluded.max_lockers,
                 numbering_format = excluded.numbering_format",
            params![
                id,
                self.name,
                self.min_lockers,
                self.max_lockers,
                self.numbering_format
            ],
        )
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(conn, "DELETE FROM container_type WHERE id = ?1", self.id)
    }
}

/// Row of `container`, the part shared by every container kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub id: Option<i64>,
    pub id_container_type: i64,
}

impl UpdatableRecord for ContainerRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        let id = self.id;
        merge_with_generated_key(
            conn,
            &mut self.id,
            "INSERT INTO container (id, id_container_type) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET id_container_type = excluded.id_container_type",
            params![id, self.id_container_type],
        )
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(conn, "DELETE FROM container WHERE id = ?1", self.id)
    }
}

/// Row of `private_container`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateContainerRecord {
    pub id_container: i64,
    pub id_account: i64,
}

impl UpdatableRecord for PrivateContainerRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO private_container (id_container, id_account) VALUES (?1, ?2)
             ON CONFLICT(id_container) DO UPDATE SET id_account = excluded.id_account",
            params![self.id_container, self.id_account],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(
            conn,
            "DELETE FROM private_container WHERE id_container = ?1",
            Some(self.id_container),
        )
    }
}

/// Row of `shared_container`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedContainerRecord {
    pub id_container: i64,
}

impl UpdatableRecord for SharedContainerRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO shared_container (id_container) VALUES (?1)",
            [self.id_container],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(
            conn,
            "DELETE FROM shared_container WHERE id_container = ?1",
            Some(self.id_container),
        )
    }
}

/// Row of `locker`
///
/// Deleting needs only the key; merging also needs the owning container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockerRecord {
    pub id: Option<i64>,
    pub id_container: Option<i64>,
    pub order: u16,
    pub color_mixed: bool,
}

impl UpdatableRecord for LockerRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        let id = self.id;
        let id_container = self.id_container.ok_or(OrmError::MissingKey {
            record: "locker.id_container",
        })?;
        merge_with_generated_key(
            conn,
            &mut self.id,
            "INSERT INTO locker (id, id_container, locker_order, color_mixed) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 id_container = excluded.id_container,
                 locker_order = excluded.locker_order,
                 color_mixed = excluded.color_mixed",
            params![id, id_container, self.order, self.color_mixed],
        )
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(conn, "DELETE FROM locker WHERE id = ?1", self.id)
    }
}
