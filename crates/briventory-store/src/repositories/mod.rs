//! Repositories of the inventory models
//!
//! Every repository is resolved through a
//! [`RepositoriesHandler`](briventory_core::RepositoriesHandler), which
//! constructs it once and wires the repositories it depends on.

pub mod accounts;
mod bricklink_tokens;
mod color_sources;
mod container_types;
mod containers;
mod lockers;

pub use accounts::AccountsRepository;
pub use bricklink_tokens::BrickLinkTokensRepository;
pub use color_sources::ColorSourcesRepository;
pub use container_types::ContainerTypesRepository;
pub use containers::ContainersRepository;
pub use lockers::LockersRepository;
