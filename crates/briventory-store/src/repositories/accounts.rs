use super::{BrickLinkTokensRepository, ColorSourcesRepository};
use crate::models::Account;
use crate::records::{AccountRecord, AdministratorRecord, ContainerRecord, LockedAccountRecord};
use briventory_core::action::single;
use briventory_core::query::{self, Query};
use briventory_core::{
    DeleteRecordAction, Injectable, PersistRecordAction, PersistenceContextExt, RecordLoader,
    RepositoriesHandler, Repository, Result,
};
use rusqlite::{Connection, Row};
use std::sync::Arc;

const SELECT: &str =
    "SELECT a.id, a.id_color_source, a.firstname, a.lastname, a.email, a.password FROM account a";

const ACTIVE_ADMINISTRATORS: &str = "FROM administrator ad \
     LEFT JOIN locked_account l ON l.id_account = ad.id_account \
     WHERE l.id_account IS NULL";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AccountRecord> {
    let password: String = row.get(5)?;
    Ok(AccountRecord {
        id: row.get(0)?,
        id_color_source: row.get(1)?,
        firstname: row.get(2)?,
        lastname: row.get(3)?,
        email: row.get(4)?,
        password: password.into(),
    })
}

/// Whether another account than `except` already uses `email`.
pub fn email_taken(conn: &Connection, email: &str, except: Option<i64>) -> Result<bool> {
    query::exists(
        conn,
        &Query::new("SELECT 1 FROM account WHERE lower(email) = lower(?1) AND id IS NOT ?2")
            .bind(email.to_owned())
            .bind(except),
    )
}

/// Whether `id` is the only administrator left that is not locked.
pub fn is_last_active_administrator(conn: &Connection, id: i64) -> Result<bool> {
    let is_active = query::exists(
        conn,
        &Query::new(format!("SELECT 1 {ACTIVE_ADMINISTRATORS} AND ad.id_account = ?1")).bind(id),
    )?;
    if !is_active {
        return Ok(false);
    }
    let active: i64 = query::fetch_single(
        conn,
        &Query::new(format!("SELECT COUNT(*) {ACTIVE_ADMINISTRATORS}")),
        |row| row.get(0),
    )?;
    Ok(active == 1)
}

/// Container rows of the private containers `id_account` owns.
pub fn private_containers_of(conn: &Connection, id_account: i64) -> Result<Vec<ContainerRecord>> {
    query::fetch(
        conn,
        &Query::new(
            "SELECT c.id, c.id_container_type FROM container c \
             JOIN private_container p ON p.id_container = c.id WHERE p.id_account = ?1",
        )
        .bind(id_account),
        |row| {
            Ok(ContainerRecord {
                id: row.get(0)?,
                id_container_type: row.get(1)?,
            })
        },
    )
}

fn marker_exists(conn: &Connection, table: &str, id_account: i64) -> Result<bool> {
    query::exists(
        conn,
        &Query::new(format!("SELECT 1 FROM {table} WHERE id_account = ?1")).bind(id_account),
    )
}

/// Accounts together with their rights, lock state and credentials
#[derive(Debug)]
pub struct AccountsRepository {
    base: Repository<Account>,
    color_sources: Arc<ColorSourcesRepository>,
    bricklink_tokens: Arc<BrickLinkTokensRepository>,
}

impl Injectable for AccountsRepository {
    fn inject(handler: &RepositoriesHandler) -> Result<Self> {
        Ok(Self {
            base: Repository::new(handler.context()),
            color_sources: handler.repository()?,
            bricklink_tokens: handler.repository()?,
        })
    }
}

impl AccountsRepository {
    pub fn base(&self) -> &Repository<Account> {
        &self.base
    }

    /// A new, unsaved account with its relations wired.
    pub fn build_instance(&self) -> Account {
        Account::with_loaders(
            self.color_sources.optional_loader(None),
            self.administrator_loader(),
            self.locked_loader(),
            self.bricklink_tokens.tokens_loader(None),
        )
    }

    fn map_row(&self, row: &Row<'_>) -> rusqlite::Result<Account> {
        let mut account = self.build_instance();
        account.load(record_from_row(row)?);
        Ok(account)
    }

    pub fn all(&self) -> Result<Vec<Account>> {
        self.base.fetch(
            &Query::new(format!("{SELECT} ORDER BY a.lastname, a.firstname, a.id")),
            |row| self.map_row(row),
        )
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        self.base.fetch_optional(
            &Query::new(format!("{SELECT} WHERE a.id = ?1")).bind(id),
            |row| self.map_row(row),
        )
    }

    /// Lookup ignoring case.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.base.fetch_optional(
            &Query::new(format!("{SELECT} WHERE lower(a.email) = lower(?1)"))
                .bind(email.to_owned()),
            |row| self.map_row(row),
        )
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        self.base.exists(
            &Query::new("SELECT 1 FROM account WHERE lower(email) = lower(?1)")
                .bind(email.to_owned()),
        )
    }

    pub fn administrators(&self) -> Result<Vec<Account>> {
        self.base.fetch(
            &Query::new(format!(
                "{SELECT} JOIN administrator ad ON ad.id_account = a.id ORDER BY a.lastname, a.firstname"
            )),
            |row| self.map_row(row),
        )
    }

    pub fn locked_accounts(&self) -> Result<Vec<Account>> {
        self.base.fetch(
            &Query::new(format!(
                "{SELECT} JOIN locked_account l ON l.id_account = a.id ORDER BY a.lastname, a.firstname"
            )),
            |row| self.map_row(row),
        )
    }

    /// Whether at least one administrator is not locked.
    pub fn has_active_administrator(&self) -> Result<bool> {
        self.base
            .exists(&Query::new(format!("SELECT 1 {ACTIVE_ADMINISTRATORS}")))
    }

    pub fn is_last_active_administrator(&self, id: i64) -> Result<bool> {
        self.base
            .context()
            .produce_in_connection(|conn: &Connection| is_last_active_administrator(conn, id))
    }

    pub fn persist(&self, account: &mut Account) -> Result<()> {
        self.base.persist(account)
    }

    pub fn persist_all(&self, accounts: &mut [Account]) -> Result<()> {
        self.base.persist_all(accounts)
    }

    pub fn delete(&self, account: &Account) -> Result<()> {
        self.base.delete(account)
    }

    pub fn delete_all(&self, accounts: &[Account]) -> Result<()> {
        self.base.delete_all(accounts)
    }

    fn administrator_loader(&self) -> RecordLoader<i64, bool> {
        self.base.create_record_loader(
            None,
            |conn: &Connection, id: &i64| marker_exists(conn, "administrator", *id),
            |_: &Connection, id: &i64, administrator: &bool| {
                let record = AdministratorRecord { id_account: *id };
                Ok(if *administrator {
                    single(PersistRecordAction::new(record))
                } else {
                    single(DeleteRecordAction::new(record))
                })
            },
        )
    }

    fn locked_loader(&self) -> RecordLoader<i64, bool> {
        self.base.create_record_loader(
            None,
            |conn: &Connection, id: &i64| marker_exists(conn, "locked_account", *id),
            |_: &Connection, id: &i64, locked: &bool| {
                let record = LockedAccountRecord { id_account: *id };
                Ok(if *locked {
                    single(PersistRecordAction::new(record))
                } else {
                    single(DeleteRecordAction::new(record))
                })
            },
        )
    }
}
