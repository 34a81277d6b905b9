//! SurrealDB implementation of [`AssignmentRepository`].
//!
//! The (user, tenant) pair is unique; the store's index is the
//! authoritative defense against a user holding two roles in one
//! tenant. Revocation deactivates and annotates the row so the grant
//! history survives.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::assignment::{Assignment, CreateAssignment, UpdateAssignment};
use warden_core::repository::AssignmentRepository;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AssignmentRow {
    user_id: String,
    tenant_id: String,
    role_id: String,
    additional_permissions: Vec<String>,
    denied_permissions: Vec<String>,
    is_active: bool,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    assigned_by: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn try_into_assignment(self, id: Uuid) -> Result<Assignment, DbError> {
        Ok(Assignment {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            role_id: parse_uuid(&self.role_id, "role")?,
            additional_permissions: self.additional_permissions,
            denied_permissions: self.denied_permissions,
            is_active: self.is_active,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            assigned_by: self
                .assigned_by
                .map(|s| parse_uuid(&s, "assigner"))
                .transpose()?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AssignmentRowWithId {
    record_id: String,
    user_id: String,
    tenant_id: String,
    role_id: String,
    additional_permissions: Vec<String>,
    denied_permissions: Vec<String>,
    is_active: bool,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    assigned_by: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AssignmentRowWithId {
    fn try_into_assignment(self) -> Result<Assignment, DbError> {
        let id = parse_uuid(&self.record_id, "assignment")?;
        Ok(Assignment {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            role_id: parse_uuid(&self.role_id, "role")?,
            additional_permissions: self.additional_permissions,
            denied_permissions: self.denied_permissions,
            is_active: self.is_active,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            assigned_by: self
                .assigned_by
                .map(|s| parse_uuid(&s, "assigner"))
                .transpose()?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

/// SurrealDB implementation of the Assignment repository.
#[derive(Clone)]
pub struct SurrealAssignmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAssignmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AssignmentRepository for SurrealAssignmentRepository<C> {
    async fn create(&self, input: CreateAssignment) -> WardenResult<Assignment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('assignment', $id) SET \
                 user_id = $user_id, tenant_id = $tenant_id, \
                 role_id = $role_id, \
                 additional_permissions = $additional_permissions, \
                 denied_permissions = $denied_permissions, \
                 is_active = true, \
                 starts_at = $starts_at, expires_at = $expires_at, \
                 assigned_by = $assigned_by, notes = $notes",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("role_id", input.role_id.to_string()))
            .bind(("additional_permissions", input.additional_permissions))
            .bind(("denied_permissions", input.denied_permissions))
            .bind(("starts_at", input.starts_at))
            .bind(("expires_at", input.expires_at))
            .bind(("assigned_by", input.assigned_by.map(|u| u.to_string())))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "assignment"))?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "assignment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_assignment(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Assignment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('assignment', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "assignment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_assignment(id)?)
    }

    async fn find_for_user_in_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> WardenResult<Option<Assignment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM assignment \
                 WHERE user_id = $user_id AND tenant_id = $tenant_id",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRowWithId> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_assignment()?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> WardenResult<Vec<Assignment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM assignment \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_assignment())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> WardenResult<Vec<Assignment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM assignment \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_assignment())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn update(&self, id: Uuid, input: UpdateAssignment) -> WardenResult<Assignment> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.role_id.is_some() {
            sets.push("role_id = $role_id");
        }
        if input.additional_permissions.is_some() {
            sets.push("additional_permissions = $additional_permissions");
        }
        if input.denied_permissions.is_some() {
            sets.push("denied_permissions = $denied_permissions");
        }
        if input.starts_at.is_some() {
            sets.push("starts_at = $starts_at");
        }
        if input.expires_at.is_some() {
            sets.push("expires_at = $expires_at");
        }
        if input.notes.is_some() {
            sets.push("notes = $notes");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('assignment', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(role_id) = input.role_id {
            builder = builder.bind(("role_id", role_id.to_string()));
        }
        if let Some(additional) = input.additional_permissions {
            builder = builder.bind(("additional_permissions", additional));
        }
        if let Some(denied) = input.denied_permissions {
            builder = builder.bind(("denied_permissions", denied));
        }
        if let Some(starts_at) = input.starts_at {
            // Option<Option<..>>: Some(None) clears the boundary.
            builder = builder.bind(("starts_at", starts_at));
        }
        if let Some(expires_at) = input.expires_at {
            builder = builder.bind(("expires_at", expires_at));
        }
        if let Some(notes) = input.notes {
            builder = builder.bind(("notes", notes));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "assignment"))?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "assignment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_assignment(id)?)
    }

    async fn revoke(&self, id: Uuid, revoked_by: Option<Uuid>) -> WardenResult<Assignment> {
        let current = self.get_by_id(id).await?;
        let id_str = id.to_string();

        let stamp = match revoked_by {
            Some(by) => format!("Revoked by {by} at {}", Utc::now().to_rfc3339()),
            None => format!("Revoked at {}", Utc::now().to_rfc3339()),
        };
        let notes = match current.notes {
            Some(existing) => format!("{existing}\n{stamp}"),
            None => stamp,
        };

        let result = self
            .db
            .query(
                "UPDATE type::record('assignment', $id) SET \
                 is_active = false, notes = $notes, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("notes", notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "assignment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_assignment(id)?)
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.db
            .query("DELETE type::record('assignment', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
