//! Role domain model.
//!
//! Roles form a global catalog; tenant scoping happens at assignment
//! time, not on the role itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    /// Globally unique display name.
    pub name: String,
    /// Globally unique short identifier (e.g., `tenant-admin`).
    /// Immutable after creation.
    pub slug: String,
    pub description: Option<String>,
    /// Privilege level; higher is more powerful
    /// (0 = viewer, 100 = super-admin).
    pub level: u32,
    /// Base permission-key set granted by this role.
    pub permissions: Vec<String>,
    pub is_active: bool,
    /// System roles cannot be renamed or deleted.
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub level: u32,
    pub permissions: Vec<String>,
    pub is_system_role: bool,
}

/// Slug and the system flag are immutable and deliberately absent here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<u32>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
