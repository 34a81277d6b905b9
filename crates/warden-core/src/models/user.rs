//! User domain model.
//!
//! Users are global: they exist independently of any tenant and gain
//! tenant access through role assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique short handle, usable as a sign-in identifier.
    pub nickname: String,
    pub email: String,
    /// Argon2id PHC-format hash. Never serialized outward; see
    /// [`User::profile`].
    pub password_hash: String,
    /// SHA-256 hex of the one currently valid refresh token.
    /// `None` means no outstanding refresh token (signed out).
    pub refresh_token_hash: Option<String>,
    pub email_verified: bool,
    pub is_active: bool,
    pub is_blocked: bool,
    pub blocked_reason: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Sanitized projection: everything secret-bearing stripped.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// What the Authenticator returns to callers — no credential hash,
/// no refresh-token hash, no block metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_blocked: Option<bool>,
    /// `Some(Some(v))` = set, `Some(None)` = clear, `None` = no change.
    pub blocked_reason: Option<Option<String>>,
}
