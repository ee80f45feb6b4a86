use super::{delete_by_key, merge_with_generated_key};
use briventory_core::{Result, UpdatableRecord};
use briventory_core_types::Sensitive;
use rusqlite::{params, Connection};

/// Row of `account`
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: Option<i64>,
    pub id_color_source: Option<i64>,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    /// Password hash.
    pub password: Sensitive<String>,
}

impl AccountRecord {
    pub fn key(id: Option<i64>) -> Self {
        Self {
            id,
            id_color_source: None,
            firstname: String::new(),
            lastname: String::new(),
            email: String::new(),
            password: Sensitive::default(),
        }
    }
}

impl UpdatableRecord for AccountRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        let id = self.id;
        merge_with_generated_key(
            conn,
            &mut self.id,
            "INSERT INTO account (id, id_color_source, firstname, lastname, email, password)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 id_color_source = excluded.id_color_source,
                 firstname = excluded.firstname,
                 lastname = excluded.lastname,
                 email = excluded.email,
                 password = excluded.password",
            params![
                id,
                self.id_color_source,
                self.firstname,
                self.lastname,
                self.email,
                self.password.expose()
            ],
        )
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(conn, "DELETE FROM account WHERE id = ?1", self.id)
    }
}

/// Row of the `administrator` marker table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdministratorRecord {
    pub id_account: i64,
}

impl UpdatableRecord for AdministratorRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO administrator (id_account) VALUES (?1)",
            [self.id_account],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(
            conn,
            "DELETE FROM administrator WHERE id_account = ?1",
            Some(self.id_account),
        )
    }
}

/// Row of the `locked_account` marker table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedAccountRecord {
    pub id_account: i64,
}

impl UpdatableRecord for LockedAccountRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO locked_account (id_account) VALUES (?1)",
            [self.id_account],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(
            conn,
            "DELETE FROM locked_account WHERE id_account = ?1",
            Some(self.id_account),
        )
    }
}
