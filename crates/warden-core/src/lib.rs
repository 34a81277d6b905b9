//! Warden Core — domain models, repository traits, password hashing,
//! and the shared error taxonomy.
//!
//! This crate has no persistence dependencies; the database crate
//! implements the repository traits and the auth crate consumes them.
//! Password hashing lives here because both sides need the same
//! peppered Argon2id treatment.

pub mod error;
pub mod models;
pub mod password;
pub mod repository;

pub use error::{WardenError, WardenResult};
