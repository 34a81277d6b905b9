//! SurrealDB implementation of [`UserRepository`].
//!
//! Raw passwords never reach a row: `create` hashes them with the
//! shared peppered Argon2id treatment. The pepper, if any, is given
//! at construction time.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::user::{CreateUser, UpdateUser, User};
use warden_core::password::hash_password;
use warden_core::repository::{PaginatedResult, Pagination, UserRepository};

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    first_name: String,
    last_name: String,
    nickname: String,
    email: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    email_verified: bool,
    is_active: bool,
    is_blocked: bool,
    blocked_reason: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    first_name: String,
    last_name: String,
    nickname: String,
    email: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    email_verified: bool,
    is_active: bool,
    is_blocked: bool,
    blocked_reason: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            nickname: self.nickname,
            email: self.email,
            password_hash: self.password_hash,
            refresh_token_hash: self.refresh_token_hash,
            email_verified: self.email_verified,
            is_active: self.is_active,
            is_blocked: self.is_blocked,
            blocked_reason: self.blocked_reason,
            last_login_at: self.last_login_at,
            last_login_ip: self.last_login_ip,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            nickname: self.nickname,
            email: self.email,
            password_hash: self.password_hash,
            refresh_token_hash: self.refresh_token_hash,
            email_verified: self.email_verified,
            is_active: self.is_active,
            is_blocked: self.is_blocked,
            blocked_reason: self.blocked_reason,
            last_login_at: self.last_login_at,
            last_login_ip: self.last_login_ip,
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

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn get_by_unique_field(&self, field: &'static str, value: &str) -> WardenResult<User> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE {field} = $value"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("{field}={value}"),
        })?;

        Ok(row.try_into_user()?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> WardenResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 first_name = $first_name, last_name = $last_name, \
                 nickname = $nickname, email = $email, \
                 password_hash = $password_hash, \
                 refresh_token_hash = NONE, \
                 email_verified = false, \
                 is_active = true, is_blocked = false, \
                 blocked_reason = NONE, \
                 last_login_at = NONE, last_login_ip = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("nickname", input.nickname))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::on_write(e, "user"))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_email(&self, email: &str) -> WardenResult<User> {
        self.get_by_unique_field("email", email).await
    }

    async fn get_by_nickname(&self, nickname: &str) -> WardenResult<User> {
        self.get_by_unique_field("nickname", nickname).await
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> WardenResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.nickname.is_some() {
            sets.push("nickname = $nickname");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.email_verified.is_some() {
            sets.push("email_verified = $email_verified");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.is_blocked.is_some() {
            sets.push("is_blocked = $is_blocked");
        }
        if input.blocked_reason.is_some() {
            sets.push("blocked_reason = $blocked_reason");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(nickname) = input.nickname {
            builder = builder.bind(("nickname", nickname));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(email_verified) = input.email_verified {
            builder = builder.bind(("email_verified", email_verified));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(is_blocked) = input.is_blocked {
            builder = builder.bind(("is_blocked", is_blocked));
        }
        if let Some(blocked_reason) = input.blocked_reason {
            // Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("blocked_reason", blocked_reason));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::on_write(e, "user"))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> WardenResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 refresh_token_hash = $hash, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("hash", hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        // An empty result means the record does not exist; the hash
        // must never be silently dropped.
        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn record_login(&self, id: Uuid, ip: Option<String>) -> WardenResult<()> {
        self.db
            .query(
                "UPDATE type::record('user', $id) SET \
                 last_login_at = time::now(), last_login_ip = $ip, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("ip", ip))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        // Soft-delete: deactivate the account.
        self.db
            .query(
                "UPDATE type::record('user', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
