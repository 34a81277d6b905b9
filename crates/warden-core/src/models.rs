//! Domain models for Warden.
//!
//! These are the core types shared across all crates.

pub mod assignment;
pub mod permission;
pub mod role;
pub mod tenant;
pub mod user;
