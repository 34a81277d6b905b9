//! SurrealDB implementation of [`TenantRepository`].
//!
//! External-service credentials are serialized to JSON and encrypted
//! with the workspace [`FieldCipher`] before they touch the store.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::tenant::{
    CreateTenant, ExternalService, ServiceCredentials, Tenant, TenantSettings, UpdateTenant,
};
use warden_core::repository::{PaginatedResult, Pagination, TenantRepository};

use crate::crypto::FieldCipher;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    slug: String,
    domain: Option<String>,
    description: Option<String>,
    is_active: bool,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id,
            name: self.name,
            slug: self.slug,
            domain: self.domain,
            description: self.description,
            is_active: self.is_active,
            settings: settings_from_value(self.settings)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    slug: String,
    domain: Option<String>,
    description: Option<String>,
    is_active: bool,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Tenant {
            id,
            name: self.name,
            slug: self.slug,
            domain: self.domain,
            description: self.description,
            is_active: self.is_active,
            settings: settings_from_value(self.settings)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Credential rows; `credentials` is the encrypted payload.
#[derive(Debug, SurrealValue)]
struct ExternalServiceRowWithId {
    record_id: String,
    tenant_id: String,
    credentials: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// The settings field is a flexible object; an empty object means the
/// tenant has no explicit settings.
fn settings_from_value(value: serde_json::Value) -> Result<Option<TenantSettings>, DbError> {
    match &value {
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        _ => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DbError::Decode(format!("invalid tenant settings: {e}"))),
    }
}

fn settings_to_value(settings: Option<TenantSettings>) -> Result<serde_json::Value, DbError> {
    match settings {
        Some(s) => serde_json::to_value(s)
            .map_err(|e| DbError::Decode(format!("settings serialize: {e}"))),
        None => Ok(serde_json::Value::Object(Default::default())),
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
    cipher: FieldCipher,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>, cipher: FieldCipher) -> Self {
        Self { db, cipher }
    }

    /// Recover typed credentials from a stored payload.
    ///
    /// Rows written before encryption was introduced hold plain JSON;
    /// when decryption fails we fall back to parsing the stored value
    /// directly rather than rejecting the record.
    fn decode_credentials(&self, stored: &str) -> Result<ServiceCredentials, DbError> {
        match self.cipher.decrypt(stored) {
            Ok(plaintext) => serde_json::from_slice(&plaintext)
                .map_err(|e| DbError::Decode(format!("credential payload: {e}"))),
            Err(_) => {
                warn!("credential decryption failed, treating stored value as plaintext");
                serde_json::from_str(stored)
                    .map_err(|e| DbError::Decode(format!("credential payload: {e}")))
            }
        }
    }

    fn row_into_service(&self, row: ExternalServiceRowWithId) -> Result<ExternalService, DbError> {
        let id = Uuid::parse_str(&row.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&row.tenant_id)
            .map_err(|e| DbError::Decode(format!("invalid tenant UUID: {e}")))?;
        let credentials = self.decode_credentials(&row.credentials)?;
        Ok(ExternalService {
            id,
            tenant_id,
            credentials,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> WardenResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let settings = settings_to_value(input.settings)?;

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, slug = $slug, \
                 domain = $domain, description = $description, \
                 is_active = true, settings = $settings",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("domain", input.domain))
            .bind(("description", input.description))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::on_write(e, "tenant"))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> WardenResult<Tenant> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> WardenResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.domain.is_some() {
            sets.push("domain = $domain");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.settings.is_some() {
            sets.push("settings = $settings");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('tenant', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(domain) = input.domain {
            builder = builder.bind(("domain", domain));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(settings) = input.settings {
            builder = builder.bind(("settings", settings_to_value(Some(settings))?));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::on_write(e, "tenant"))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id)?)
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        // Soft-delete: deactivate the tenant.
        self.db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<Tenant>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn upsert_service_credentials(
        &self,
        tenant_id: Uuid,
        credentials: ServiceCredentials,
    ) -> WardenResult<ExternalService> {
        let tenant_id_str = tenant_id.to_string();
        let kind = credentials.kind();

        let payload = serde_json::to_vec(&credentials)
            .map_err(|e| DbError::Decode(format!("credential serialize: {e}")))?;
        let encrypted = self.cipher.encrypt(&payload)?;

        // One record per (tenant, kind): replace in place when present,
        // create otherwise. UPSERT against a deterministic ID would
        // leak the kind into the record ID, so we do a lookup first and
        // rely on the unique index as the concurrency backstop.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM external_service \
                 WHERE tenant_id = $tenant_id AND kind = $kind",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .bind(("kind", kind))
            .await
            .map_err(DbError::from)?;
        let existing: Vec<ExternalServiceRowWithId> = result.take(0).map_err(DbError::from)?;

        let (query, id_str) = match existing.first() {
            Some(row) => (
                "UPDATE type::record('external_service', $id) SET \
                 credentials = $credentials, is_active = true, \
                 updated_at = time::now()",
                row.record_id.clone(),
            ),
            None => (
                "CREATE type::record('external_service', $id) SET \
                 tenant_id = $tenant_id, kind = $kind, \
                 credentials = $credentials, is_active = true",
                Uuid::new_v4().to_string(),
            ),
        };

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .bind(("kind", kind))
            .bind(("credentials", encrypted))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::on_write(e, "external_service"))?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('external_service', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExternalServiceRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "external_service".into(),
            id: id_str,
        })?;

        Ok(self.row_into_service(row)?)
    }

    async fn list_service_credentials(
        &self,
        tenant_id: Uuid,
    ) -> WardenResult<Vec<ExternalService>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM external_service \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ExternalServiceRowWithId> = result.take(0).map_err(DbError::from)?;

        let services = rows
            .into_iter()
            .map(|row| self.row_into_service(row))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(services)
    }
}
