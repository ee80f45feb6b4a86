#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use briventory_core::{PersistenceContextExt, RepositoriesHandler};
use briventory_store::models::{Account, ContainerType};
use briventory_store::{AccountsRepository, ContainerTypesRepository, SqliteContext, StoreConfig};
use std::sync::Arc;

/// In-memory store with the schema and a handler over it
pub fn open_store() -> (Arc<SqliteContext>, RepositoriesHandler) {
    let context = Arc::new(SqliteContext::open(&StoreConfig::in_memory()).unwrap());
    let handler = RepositoriesHandler::new(context.clone());
    (context, handler)
}

pub fn count(context: &SqliteContext, table: &str) -> i64 {
    context
        .produce_in_connection(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?)
        })
        .unwrap()
}

pub fn count_where(context: &SqliteContext, table: &str, condition: &str) -> i64 {
    count(context, &format!("{table} WHERE {condition}"))
}

pub fn new_account(accounts: &AccountsRepository, firstname: &str, email: &str) -> Account {
    let mut account = accounts.build_instance();
    account
        .set_firstname(firstname)
        .set_lastname("Doe")
        .set_email(email);
    account.set_clear_password("s3cret-bricks").unwrap();
    account
}

/// Persisted account, administrator when asked
pub fn stored_account(
    accounts: &AccountsRepository,
    firstname: &str,
    email: &str,
    administrator: bool,
) -> Account {
    let mut account = new_account(accounts, firstname, email);
    if administrator {
        account.set_administrator(true);
    }
    accounts.persist(&mut account).unwrap();
    account
}

pub fn stored_container_type(
    handler: &RepositoriesHandler,
    name: &str,
    min_lockers: u16,
    max_lockers: u16,
) -> ContainerType {
    let container_types = handler.repository::<ContainerTypesRepository>().unwrap();
    let mut container_type = ContainerType::new(name, min_lockers, max_lockers);
    container_types.persist(&mut container_type).unwrap();
    container_type
}
