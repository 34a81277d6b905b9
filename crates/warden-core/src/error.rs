//! Error types for the Warden system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Duplicate unique field on create — the Conflict case.
    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// The Unauthorized case: bad credentials, invalid or rotated
    /// token, inactive/blocked account, no tenant access.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// The Forbidden case: authenticated but missing a required
    /// permission. Names the missing key for operator debugging.
    #[error("Permission denied: requires {required}")]
    PermissionDenied { required: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WardenResult<T> = Result<T, WardenError>;
