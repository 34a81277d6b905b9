//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Unique-index violations in the
//! store are the authoritative duplicate defense and surface as
//! [`WardenError::AlreadyExists`]; any pre-check lookup an
//! implementation performs is an optimization, not a substitute.

use uuid::Uuid;

use crate::error::WardenResult;
use crate::models::{
    assignment::{Assignment, CreateAssignment, UpdateAssignment},
    permission::{CreatePermission, Permission, UpdatePermission},
    role::{CreateRole, Role, UpdateRole},
    tenant::{CreateTenant, ExternalService, ServiceCredentials, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait UserRepository: Send + Sync {
    /// Create a user, hashing the raw password. Fails with
    /// `AlreadyExists` when the email or nickname is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_nickname(&self, nickname: &str) -> impl Future<Output = WardenResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = WardenResult<User>> + Send;
    /// Replace the stored refresh-token hash; `None` clears it.
    /// Replacing is the rotation invariant: at most one valid refresh
    /// token per user.
    fn set_refresh_token_hash(
        &self,
        id: Uuid,
        hash: Option<String>,
    ) -> impl Future<Output = WardenResult<()>> + Send;
    /// Record a successful sign-in (timestamp + source address).
    fn record_login(
        &self,
        id: Uuid,
        ip: Option<String>,
    ) -> impl Future<Output = WardenResult<()>> + Send;
    /// Soft-delete: sets `is_active` to false.
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<User>>> + Send;
}

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = WardenResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Tenant>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = WardenResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = WardenResult<Tenant>> + Send;
    /// Soft-delete: sets `is_active` to false.
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<Tenant>>> + Send;

    /// Store credentials for an external service, encrypted at rest.
    /// One record per (tenant, service kind); storing again replaces it.
    fn upsert_service_credentials(
        &self,
        tenant_id: Uuid,
        credentials: ServiceCredentials,
    ) -> impl Future<Output = WardenResult<ExternalService>> + Send;

    /// Decrypted credential records for a tenant.
    fn list_service_credentials(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = WardenResult<Vec<ExternalService>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = WardenResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Role>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = WardenResult<Role>> + Send;
    /// Fails with `Validation` when attempting to rename a system role.
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = WardenResult<Role>> + Send;
    /// Fails with `Validation` for system roles.
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<Role>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_key(&self, key: &str) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePermission,
    ) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<Permission>>> + Send;
}

pub trait AssignmentRepository: Send + Sync {
    /// Grant a role to a user within a tenant. Fails with
    /// `AlreadyExists` when the (user, tenant) pair already has an
    /// assignment — enforced by the store's uniqueness constraint.
    fn create(
        &self,
        input: CreateAssignment,
    ) -> impl Future<Output = WardenResult<Assignment>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Assignment>> + Send;
    /// The single assignment for a (user, tenant) pair, if any.
    /// Absence is a valid answer, not an error.
    fn find_for_user_in_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> impl Future<Output = WardenResult<Option<Assignment>>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = WardenResult<Vec<Assignment>>> + Send;
    fn list_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = WardenResult<Vec<Assignment>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAssignment,
    ) -> impl Future<Output = WardenResult<Assignment>> + Send;
    /// Deactivate (never deletes) and append a revocation audit note.
    /// The validity window is left untouched.
    fn revoke(
        &self,
        id: Uuid,
        revoked_by: Option<Uuid>,
    ) -> impl Future<Output = WardenResult<Assignment>> + Send;
    /// Administrative purge; normal revocation keeps the row.
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
}
