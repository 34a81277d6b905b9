//! Warden Database — SurrealDB connection management, schema
//! migrations, and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Field-level credential encryption ([`FieldCipher`])
//! - SurrealDB implementations of the `warden-core` repository traits

mod connection;
mod crypto;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager, ping};
pub use crypto::FieldCipher;
pub use error::DbError;
pub use schema::run_migrations;
