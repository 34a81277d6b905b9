//! SurrealDB repository implementations.

mod assignment;
mod permission;
mod role;
mod tenant;
mod user;

pub use assignment::SurrealAssignmentRepository;
pub use permission::SurrealPermissionRepository;
pub use role::SurrealRoleRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
