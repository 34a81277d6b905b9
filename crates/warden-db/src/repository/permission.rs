//! SurrealDB implementation of [`PermissionRepository`].
//!
//! The catalog table stores the UI grouping as `display_group` because
//! `group` is reserved in SurrealQL.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::permission::{CreatePermission, Permission, UpdatePermission};
use warden_core::repository::{PaginatedResult, Pagination, PermissionRepository};

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PermissionRow {
    key: String,
    description: String,
    display_group: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn into_permission(self, id: Uuid) -> Permission {
        Permission {
            id,
            key: self.key,
            description: self.description,
            group: self.display_group,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    key: String,
    description: String,
    display_group: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Permission {
            id,
            key: self.key,
            description: self.description,
            group: self.display_group,
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

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> WardenResult<Permission> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 key = $key, description = $description, \
                 display_group = $display_group",
            )
            .bind(("id", id_str.clone()))
            .bind(("key", input.key))
            .bind(("description", input.description))
            .bind(("display_group", input.group))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "permission"))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id))
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id))
    }

    async fn get_by_key(&self, key: &str) -> WardenResult<Permission> {
        let key_owned = key.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM permission WHERE key = $key",
            )
            .bind(("key", key_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: format!("key={key}"),
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePermission) -> WardenResult<Permission> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.group.is_some() {
            sets.push("display_group = $display_group");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('permission', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(group) = input.group {
            builder = builder.bind(("display_group", group));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "permission"))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id))
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.db
            .query("DELETE type::record('permission', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<Permission>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM permission GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY display_group ASC, key ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
