//! SurrealDB implementation of [`RoleRepository`].
//!
//! System roles are protected here rather than in the service layer so
//! every caller gets the same guarantee: no rename, no delete.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::role::{CreateRole, Role, UpdateRole};
use warden_core::repository::{PaginatedResult, Pagination, RoleRepository};

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    slug: String,
    description: Option<String>,
    level: u32,
    permissions: Vec<String>,
    is_active: bool,
    is_system_role: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Role {
        Role {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            level: self.level,
            permissions: self.permissions,
            is_active: self.is_active,
            is_system_role: self.is_system_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    level: u32,
    permissions: Vec<String>,
    is_active: bool,
    is_system_role: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Role {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            level: self.level,
            permissions: self.permissions,
            is_active: self.is_active,
            is_system_role: self.is_system_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> WardenResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, slug = $slug, \
                 description = $description, level = $level, \
                 permissions = $permissions, \
                 is_active = true, \
                 is_system_role = $is_system_role",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("description", input.description))
            .bind(("level", input.level))
            .bind(("permissions", input.permissions))
            .bind(("is_system_role", input.is_system_role))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::on_write(e, "role"))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_slug(&self, slug: &str) -> WardenResult<Role> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM role WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> WardenResult<Role> {
        let current = self.get_by_id(id).await?;
        if current.is_system_role && input.name.is_some() {
            return Err(WardenError::Validation {
                message: "system roles cannot be renamed".into(),
            });
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.level.is_some() {
            sets.push("level = $level");
        }
        if input.permissions.is_some() {
            sets.push("permissions = $permissions");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('role', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(level) = input.level {
            builder = builder.bind(("level", level));
        }
        if let Some(permissions) = input.permissions {
            builder = builder.bind(("permissions", permissions));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::on_write(e, "role"))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        let current = self.get_by_id(id).await?;
        if current.is_system_role {
            return Err(WardenError::Validation {
                message: "system roles cannot be deleted".into(),
            });
        }

        self.db
            .query("DELETE type::record('role', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<Role>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM role GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 ORDER BY level DESC, created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
