//! Database-specific error types and conversions.

use warden_core::error::WardenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// Unique-index violation. The store is the authoritative defense
    /// against duplicates; this is the canonical "already exists"
    /// signal.
    #[error("Duplicate record: {entity}")]
    Conflict { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Stored data could not be decoded: {0}")]
    Decode(String),
}

impl DbError {
    /// Classify a statement error from a create/insert: unique-index
    /// violations become [`DbError::Conflict`], everything else passes
    /// through.
    pub(crate) fn on_write(err: surrealdb::Error, entity: &str) -> DbError {
        let msg = err.to_string();
        if msg.contains("already contains") {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else {
            DbError::Surreal(err)
        }
    }
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WardenError::NotFound { entity, id },
            DbError::Conflict { entity } => WardenError::AlreadyExists { entity },
            other => WardenError::Database(other.to_string()),
        }
    }
}
