//! JWT token pair issuance and verification.
//!
//! Both token kinds are HS256 JWTs carrying the same claim shape. They
//! are signed with independent secrets: a token minted with one secret
//! never verifies under the other. The refresh token is additionally
//! anchored server-side as a SHA-256 hash on the user row, which is
//! what makes rotation and sign-out effective.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in both access and refresh tokens.
///
/// The tenant fields are present only when the session was opened
/// against a specific tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role_slug: Option<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))
    }

    pub fn tenant_id(&self) -> Result<Option<Uuid>, AuthError> {
        self.tenant_id
            .as_deref()
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|e| AuthError::TokenInvalid(format!("bad tenant id: {e}")))
            })
            .transpose()
    }
}

/// The identity and tenant context a token pair is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub tenant_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub role_slug: Option<String>,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

fn build_claims(subject: &TokenSubject, lifetime_secs: u64, issuer: &str) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: subject.user_id.to_string(),
        email: subject.email.clone(),
        tenant_id: subject.tenant_id.map(|t| t.to_string()),
        role_id: subject.role_id.map(|r| r.to_string()),
        role_slug: subject.role_slug.clone(),
        iss: issuer.to_string(),
        iat: now,
        exp: now + lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    }
}

fn sign(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::new(Algorithm::HS256);
    jsonwebtoken::encode(&header, claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

fn decode(token: &str, secret: &str, issuer: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Issue a short-lived access token signed with the access secret.
pub fn issue_access_token(subject: &TokenSubject, config: &AuthConfig) -> Result<String, AuthError> {
    let claims = build_claims(subject, config.access_token_lifetime_secs, &config.jwt_issuer);
    sign(&claims, &config.access_token_secret)
}

/// Issue a long-lived refresh token signed with the refresh secret.
pub fn issue_refresh_token(
    subject: &TokenSubject,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let claims = build_claims(
        subject,
        config.refresh_token_lifetime_secs,
        &config.jwt_issuer,
    );
    sign(&claims, &config.refresh_token_secret)
}

/// Issue both tokens for the same subject.
pub fn issue_pair(subject: &TokenSubject, config: &AuthConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: issue_access_token(subject, config)?,
        refresh_token: issue_refresh_token(subject, config)?,
        expires_in: config.access_token_lifetime_secs,
    })
}

/// Decode and verify an access token (signature, expiry, issuer).
pub fn decode_access_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    decode(token, &config.access_token_secret, &config.jwt_issuer)
}

/// Decode and verify a refresh token (signature, expiry, issuer).
pub fn decode_refresh_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    decode(token, &config.refresh_token_secret, &config.jwt_issuer)
}

/// Verified access token claims — a newtype proving the token passed
/// signature and expiry checks.
///
/// Used by the transport layer to extract authenticated context from
/// incoming requests.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub Claims);

/// Validate an access token and return the verified claims.
///
/// Purely stateless: no database lookup is performed. Callers that
/// need the revocation/blocked checks go through
/// `AuthService::validate_access`.
pub fn validate_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

/// SHA-256 hash of a raw refresh token, hex-encoded.
///
/// This is the value stored as `user.refresh_token_hash`.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
