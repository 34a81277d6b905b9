//! Tenant-scoped authorization: role resolution and the permission
//! algebra.
//!
//! The effective permission set for a user in a tenant is
//! `(role base ∪ assignment additions) \ assignment denials`, computed
//! only while the assignment is currently active. Denials always win.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::assignment::Assignment;
use warden_core::models::role::Role;
use warden_core::repository::{AssignmentRepository, RoleRepository};

/// Resolves roles and answers permission checks.
///
/// Generic over repository implementations so the auth layer has no
/// dependency on the database crate.
pub struct Authorizer<A: AssignmentRepository, R: RoleRepository> {
    assignment_repo: A,
    role_repo: R,
}

/// Compute the effective permission set.
///
/// Empty when the assignment is not currently active; otherwise the
/// role's base set plus the assignment's additions, minus its denials.
/// The result is deduplicated and order-independent.
pub fn effective_permissions(
    assignment: &Assignment,
    role: &Role,
    now: DateTime<Utc>,
) -> BTreeSet<String> {
    if !assignment.is_currently_active(now) {
        return BTreeSet::new();
    }

    let mut set: BTreeSet<String> = role.permissions.iter().cloned().collect();
    set.extend(assignment.additional_permissions.iter().cloned());
    for denied in &assignment.denied_permissions {
        set.remove(denied);
    }
    set
}

/// Whether a granted entry covers the requested key.
///
/// Three ways to match: the exact key, the `"*"` sentinel granting
/// everything, or a namespace wildcard `ns.*` covering every key
/// strictly inside the `ns.` namespace. The namespace may itself be
/// dotted, so `users.admin.*` covers `users.admin.ban`. The wildcard
/// never covers the bare namespace name.
pub fn grant_covers(granted: &str, requested: &str) -> bool {
    if granted == requested || granted == "*" {
        return true;
    }
    if let Some(namespace) = granted.strip_suffix(".*") {
        return requested
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.len() > 1 && rest.starts_with('.'));
    }
    false
}

impl<A: AssignmentRepository, R: RoleRepository> Authorizer<A, R> {
    pub fn new(assignment_repo: A, role_repo: R) -> Self {
        Self {
            assignment_repo,
            role_repo,
        }
    }

    /// The user's assignment in the tenant joined with its role, or
    /// `None` when absent or not currently active. Absence is a valid
    /// answer, never an error.
    pub async fn resolve_role(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> WardenResult<Option<(Assignment, Role)>> {
        let Some(assignment) = self
            .assignment_repo
            .find_for_user_in_tenant(user_id, tenant_id)
            .await?
        else {
            return Ok(None);
        };

        if !assignment.is_currently_active(Utc::now()) {
            return Ok(None);
        }

        let role = self.role_repo.get_by_id(assignment.role_id).await?;
        Ok(Some((assignment, role)))
    }

    /// The user's effective permission keys in the tenant. Empty when
    /// the user has no currently active assignment there.
    pub async fn permissions_for(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> WardenResult<BTreeSet<String>> {
        match self.resolve_role(user_id, tenant_id).await? {
            Some((assignment, role)) => {
                Ok(effective_permissions(&assignment, &role, Utc::now()))
            }
            None => Ok(BTreeSet::new()),
        }
    }

    /// True iff the user holds `permission` in the tenant, directly or
    /// through a wildcard grant.
    pub async fn check_permission(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        permission: &str,
    ) -> WardenResult<bool> {
        let granted = self.permissions_for(user_id, tenant_id).await?;
        Ok(granted.iter().any(|g| grant_covers(g, permission)))
    }

    /// Like [`check_permission`](Self::check_permission) but a false
    /// answer becomes `PermissionDenied` naming the missing key.
    pub async fn require_permission(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        permission: &str,
    ) -> WardenResult<()> {
        if self.check_permission(user_id, tenant_id, permission).await? {
            Ok(())
        } else {
            Err(WardenError::PermissionDenied {
                required: permission.to_string(),
            })
        }
    }
}
