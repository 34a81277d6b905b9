//! Permission catalog entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Atomic capability descriptor. The catalog is documentation for
/// admin tooling; authorization works on the key strings embedded in
/// roles and assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    /// Globally unique dotted key (e.g., `users.create`). A `.*`
    /// suffix is a wildcard convention resolved by the Authorizer.
    pub key: String,
    pub description: String,
    /// Display group for UIs (e.g., `Users`).
    pub group: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub key: String,
    pub description: String,
    pub group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePermission {
    pub description: Option<String>,
    pub group: Option<String>,
}
