//! Briventory Store - SQLite persistence for the inventory
//!
//! - `SqliteContext`: the persistence context over one SQLite connection
//! - `schema`: the embedded, idempotent table definitions
//! - `records`: one updatable record per table
//! - `models`: accounts, color sources, containers and lockers
//! - `repositories`: the injectable repositories of those models

pub mod config;
pub mod context;
pub mod db;
pub mod errors;
pub mod models;
pub mod records;
pub mod repositories;
pub mod schema;

pub use config::StoreConfig;
pub use context::SqliteContext;
pub use repositories::{
    AccountsRepository, BrickLinkTokensRepository, ColorSourcesRepository,
    ContainerTypesRepository, ContainersRepository, LockersRepository,
};
