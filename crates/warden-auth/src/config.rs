//! Authentication configuration.

/// Configuration for the authentication service.
///
/// Access and refresh tokens are signed with independent secrets so a
/// leaked access secret cannot mint refresh tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret for access token signing and verification.
    pub access_token_secret: String,
    /// HS256 secret for refresh token signing and verification.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 604_800,
            jwt_issuer: "warden".into(),
            pepper: None,
            min_password_length: 8,
        }
    }
}
