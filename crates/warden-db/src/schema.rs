//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. The UNIQUE indexes below are the
//! authoritative concurrency defense for duplicate sign-ups and
//! duplicate tenant-role assignments.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (global scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD nickname ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD refresh_token_hash ON TABLE user TYPE option<string>;
DEFINE FIELD email_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD is_blocked ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD blocked_reason ON TABLE user TYPE option<string>;
DEFINE FIELD last_login_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD last_login_ip ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_nickname ON TABLE user COLUMNS nickname UNIQUE;

-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD domain ON TABLE tenant TYPE option<string>;
DEFINE FIELD description ON TABLE tenant TYPE option<string>;
DEFINE FIELD is_active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD settings ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_name ON TABLE tenant COLUMNS name UNIQUE;
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Tenant external-service credentials (encrypted at rest)
-- =======================================================================
DEFINE TABLE external_service SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE external_service TYPE string;
DEFINE FIELD kind ON TABLE external_service TYPE string;
DEFINE FIELD credentials ON TABLE external_service TYPE string;
DEFINE FIELD is_active ON TABLE external_service TYPE bool \
    DEFAULT true;
DEFINE FIELD created_at ON TABLE external_service TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE external_service TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_external_service_tenant_kind ON TABLE \
    external_service COLUMNS tenant_id, kind UNIQUE;

-- =======================================================================
-- Roles (global catalog)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD slug ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE option<string>;
DEFINE FIELD level ON TABLE role TYPE int DEFAULT 0;
DEFINE FIELD permissions ON TABLE role TYPE array DEFAULT [];
DEFINE FIELD permissions.* ON TABLE role TYPE string;
DEFINE FIELD is_active ON TABLE role TYPE bool DEFAULT true;
DEFINE FIELD is_system_role ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;
DEFINE INDEX idx_role_slug ON TABLE role COLUMNS slug UNIQUE;

-- =======================================================================
-- Permission catalog
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD key ON TABLE permission TYPE string;
DEFINE FIELD description ON TABLE permission TYPE string;
DEFINE FIELD display_group ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_key ON TABLE permission COLUMNS key UNIQUE;

-- =======================================================================
-- Tenant-role assignments (one per user per tenant)
-- =======================================================================
DEFINE TABLE assignment SCHEMAFULL;
DEFINE FIELD user_id ON TABLE assignment TYPE string;
DEFINE FIELD tenant_id ON TABLE assignment TYPE string;
DEFINE FIELD role_id ON TABLE assignment TYPE string;
DEFINE FIELD additional_permissions ON TABLE assignment TYPE array \
    DEFAULT [];
DEFINE FIELD additional_permissions.* ON TABLE assignment TYPE string;
DEFINE FIELD denied_permissions ON TABLE assignment TYPE array \
    DEFAULT [];
DEFINE FIELD denied_permissions.* ON TABLE assignment TYPE string;
DEFINE FIELD is_active ON TABLE assignment TYPE bool DEFAULT true;
DEFINE FIELD starts_at ON TABLE assignment TYPE option<datetime>;
DEFINE FIELD expires_at ON TABLE assignment TYPE option<datetime>;
DEFINE FIELD assigned_by ON TABLE assignment TYPE option<string>;
DEFINE FIELD notes ON TABLE assignment TYPE option<string>;
DEFINE FIELD created_at ON TABLE assignment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE assignment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_assignment_user_tenant ON TABLE assignment \
    COLUMNS user_id, tenant_id UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}
