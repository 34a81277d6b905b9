//! Authentication error types.

use thiserror::Error;
use warden_core::error::WardenError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately generic: covers both unknown identifier and wrong
    /// password so the response does not leak which accounts exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("account is blocked: {0}")]
    AccountBlocked(String),

    #[error("no active role in the requested tenant")]
    NoTenantAccess,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// The presented refresh token does not match the stored hash; it
    /// was rotated away or signed out.
    #[error("token has been revoked")]
    TokenRevoked,

    /// Token signing or key handling failed; never a caller mistake.
    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Crypto(msg) => WardenError::Crypto(msg),
            other => WardenError::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}
