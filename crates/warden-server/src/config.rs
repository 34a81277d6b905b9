//! Server configuration loaded from the environment.
//!
//! All knobs are read once at startup; business logic never touches
//! `std::env`.

use std::env;

use thiserror::Error;
use warden_auth::AuthConfig;
use warden_db::DbConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// AES-256 key for encrypting tenant service credentials at rest.
    pub credential_key: [u8; 32],
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
            name,
            reason: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Decode a 64-character hex string into a 32-byte key.
pub(crate) fn parse_credential_key(raw: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = hex::decode(raw).map_err(|e| ConfigError::Invalid {
        name: "WARDEN_CREDENTIAL_KEY",
        reason: format!("not valid hex: {e}"),
    })?;
    bytes.try_into().map_err(|_| ConfigError::Invalid {
        name: "WARDEN_CREDENTIAL_KEY",
        reason: "expected 32 bytes (64 hex characters)".into(),
    })
}

impl ServerConfig {
    /// Build the configuration from environment variables.
    ///
    /// Token secrets and the credential key have no defaults; the
    /// server refuses to start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db = DbConfig {
            url: optional("WARDEN_DB_URL", "127.0.0.1:8000"),
            namespace: optional("WARDEN_DB_NAMESPACE", "warden"),
            database: optional("WARDEN_DB_DATABASE", "main"),
            username: optional("WARDEN_DB_USERNAME", "root"),
            password: optional("WARDEN_DB_PASSWORD", "root"),
        };

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            access_token_secret: required("WARDEN_ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: required("WARDEN_REFRESH_TOKEN_SECRET")?,
            access_token_lifetime_secs: parse_u64(
                "WARDEN_ACCESS_TOKEN_LIFETIME_SECS",
                defaults.access_token_lifetime_secs,
            )?,
            refresh_token_lifetime_secs: parse_u64(
                "WARDEN_REFRESH_TOKEN_LIFETIME_SECS",
                defaults.refresh_token_lifetime_secs,
            )?,
            jwt_issuer: optional("WARDEN_JWT_ISSUER", &defaults.jwt_issuer),
            pepper: env::var("WARDEN_PASSWORD_PEPPER").ok(),
            min_password_length: parse_u64(
                "WARDEN_MIN_PASSWORD_LENGTH",
                defaults.min_password_length as u64,
            )? as usize,
        };

        let credential_key = parse_credential_key(&required("WARDEN_CREDENTIAL_KEY")?)?;

        Ok(Self {
            db,
            auth,
            credential_key,
        })
    }
}
