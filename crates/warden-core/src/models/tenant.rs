//! Tenant domain model.
//!
//! A tenant is an isolated organizational namespace sharing the same
//! application instance. Users are bound to tenants through role
//! assignments only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Globally unique display name.
    pub name: String,
    /// Globally unique URL-safe identifier.
    pub slug: String,
    /// Custom domain, if the tenant serves under one.
    pub domain: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub settings: Option<TenantSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-tenant UI and behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSettings {
    pub theme: String,
    pub primary_color: String,
    pub locale: String,
    pub timezone: String,
    pub maintenance_mode: bool,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            theme: "light".into(),
            primary_color: "#3B82F6".into(),
            locale: "en".into(),
            timezone: "UTC".into(),
            maintenance_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub domain: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub settings: Option<TenantSettings>,
}

/// Third-party service credentials held on behalf of a tenant.
///
/// A closed tagged union: each supported integration has an explicit
/// shape, validated at the boundary. Stored encrypted at rest; the
/// variant tag doubles as the uniqueness key per tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ServiceCredentials {
    /// S3-compatible object storage (AWS S3, DO Spaces, ...).
    ObjectStorage {
        endpoint: Option<String>,
        access_key_id: String,
        secret_access_key: String,
        bucket: String,
        region: String,
    },
    /// Outbound mail relay.
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
    },
    /// Single-key HTTP API services (Stripe, SendGrid, ...).
    ApiKey { provider: String, api_key: String },
}

impl ServiceCredentials {
    /// Stable kind tag used for per-tenant uniqueness.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceCredentials::ObjectStorage { .. } => "object_storage",
            ServiceCredentials::Smtp { .. } => "smtp",
            ServiceCredentials::ApiKey { .. } => "api_key",
        }
    }
}

/// A stored external-service credential record, decrypted for the
/// caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalService {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub credentials: ServiceCredentials,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
