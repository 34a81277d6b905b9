//! Tenant-role assignment — the join entity binding one user to one
//! role within one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state derived from the row fields; see [`Assignment::state`].
///
/// `Pending → Active → Expired` as time passes; `Active → Revoked` on
/// explicit revocation. There is no transition out of `Revoked` or
/// `Expired` — restoring access means a new assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentState {
    Pending,
    Active,
    Expired,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role_id: Uuid,
    /// Keys granted beyond the role's base set, this tenant only.
    pub additional_permissions: Vec<String>,
    /// Keys removed from the effective set, this tenant only.
    pub denied_permissions: Vec<String>,
    pub is_active: bool,
    /// Validity window start; unset = effective immediately.
    pub starts_at: Option<DateTime<Utc>>,
    /// Validity window end; unset = no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
    /// Free-text audit trail; revocations append here.
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.is_none_or(|t| now >= t)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }

    /// Currently active per the validity definition: the activity flag
    /// is set and `now` falls inside the window. An assignment that is
    /// not currently active grants nothing, even though the row remains
    /// for audit purposes.
    pub fn is_currently_active(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.has_started(now) && !self.is_expired(now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> AssignmentState {
        if !self.is_active {
            AssignmentState::Revoked
        } else if self.is_expired(now) {
            AssignmentState::Expired
        } else if !self.has_started(now) {
            AssignmentState::Pending
        } else {
            AssignmentState::Active
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignment {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role_id: Uuid,
    pub additional_permissions: Vec<String>,
    pub denied_permissions: Vec<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAssignment {
    pub role_id: Option<Uuid>,
    pub additional_permissions: Option<Vec<String>>,
    pub denied_permissions: Option<Vec<String>>,
    pub starts_at: Option<Option<DateTime<Utc>>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub notes: Option<String>,
}
