//! Inventory models
//!
//! Each model declares how it is validated, which records it is written as
//! and which relations it loads lazily.

mod account;
mod bricklink_tokens;
mod color_source;
mod container;
mod container_type;
mod locker;

pub use account::Account;
pub use bricklink_tokens::BrickLinkTokens;
pub use color_source::ColorSource;
pub use container::{Container, PrivateContainer, SharedContainer};
pub use container_type::ContainerType;
pub use locker::Locker;

/// `true` when the value is empty or only whitespace
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
