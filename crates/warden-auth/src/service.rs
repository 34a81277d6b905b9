//! Authentication service — sign-up, sign-in, refresh, sign-out.

use tracing::{info, warn};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::user::{CreateUser, User, UserProfile};
use warden_core::password;
use warden_core::repository::{AssignmentRepository, RoleRepository, UserRepository};

use crate::authorize::Authorizer;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{self, TokenPair, TokenSubject, ValidatedClaims};

/// Input for the sign-up flow.
#[derive(Debug)]
pub struct SignUpInput {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
}

/// Input for the sign-in flow.
#[derive(Debug)]
pub struct SignInInput {
    /// Email or nickname.
    pub identifier: String,
    pub password: String,
    /// When set, the session is scoped to this tenant and the user
    /// must hold a currently active role there.
    pub tenant_id: Option<Uuid>,
    pub ip_address: Option<String>,
}

/// Successful sign-in result.
#[derive(Debug)]
pub struct SignInOutput {
    pub tokens: TokenPair,
    pub profile: UserProfile,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<U, A, R>
where
    U: UserRepository,
    A: AssignmentRepository,
    R: RoleRepository,
{
    user_repo: U,
    authorizer: Authorizer<A, R>,
    config: AuthConfig,
}

impl<U, A, R> AuthService<U, A, R>
where
    U: UserRepository,
    A: AssignmentRepository,
    R: RoleRepository,
{
    pub fn new(user_repo: U, authorizer: Authorizer<A, R>, config: AuthConfig) -> Self {
        Self {
            user_repo,
            authorizer,
            config,
        }
    }

    pub fn authorizer(&self) -> &Authorizer<A, R> {
        &self.authorizer
    }

    /// Register a new account and return the sanitized profile.
    pub async fn sign_up(&self, input: SignUpInput) -> WardenResult<UserProfile> {
        if input.password.chars().count() < self.config.min_password_length {
            return Err(WardenError::Validation {
                message: format!(
                    "password must be at least {} characters",
                    self.config.min_password_length
                ),
            });
        }

        let user = self
            .user_repo
            .create(CreateUser {
                first_name: input.first_name,
                last_name: input.last_name,
                nickname: input.nickname,
                email: input.email,
                password: input.password,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user.profile())
    }

    /// Authenticate with identifier + password and issue a token pair.
    pub async fn sign_in(&self, input: SignInInput) -> WardenResult<SignInOutput> {
        // 1. Look up user: email first, then nickname. Both failure
        //    modes collapse into InvalidCredentials.
        let user = match self.user_repo.get_by_email(&input.identifier).await {
            Ok(u) => u,
            Err(WardenError::NotFound { .. }) => self
                .user_repo
                .get_by_nickname(&input.identifier)
                .await
                .map_err(|_| AuthError::InvalidCredentials)?,
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Check account state.
        self.check_account(&user)?;

        // 4. Resolve tenant role when the session is tenant-scoped.
        let subject = self.build_subject(&user, input.tenant_id).await?;

        // 5. Issue the pair and persist the refresh hash before
        //    returning; a token the store does not know about must
        //    never reach the client.
        let tokens = token::issue_pair(&subject, &self.config).map_err(WardenError::from)?;
        let hash = token::hash_refresh_token(&tokens.refresh_token);
        self.user_repo
            .set_refresh_token_hash(user.id, Some(hash))
            .await?;

        // 6. Record the login stamp. Best effort only; the session is
        //    already established and the old refresh token is gone, so
        //    a failed stamp must not turn the sign-in into an error.
        if let Err(e) = self.user_repo.record_login(user.id, input.ip_address).await {
            warn!(user_id = %user.id, error = %e, "login stamp not recorded");
        }

        info!(user_id = %user.id, tenant_id = ?input.tenant_id, "user signed in");

        Ok(SignInOutput {
            tokens,
            profile: user.profile(),
        })
    }

    /// Rotate a refresh token: verify it against the stored hash,
    /// re-check the account and tenant access, and issue a new pair.
    ///
    /// Each refresh token is single-use: persisting the new hash
    /// invalidates the presented one.
    pub async fn refresh(&self, raw_refresh_token: &str) -> WardenResult<TokenPair> {
        // 1. Decode with the refresh secret (signature, expiry, issuer).
        let claims = token::decode_refresh_token(raw_refresh_token, &self.config)
            .map_err(WardenError::from)?;
        let user_id = claims.user_id().map_err(WardenError::from)?;

        // 2. The token must match the one hash the store considers
        //    current.
        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(u) => u,
            Err(WardenError::NotFound { .. }) => {
                return Err(AuthError::TokenRevoked.into());
            }
            Err(e) => return Err(e),
        };

        let presented = token::hash_refresh_token(raw_refresh_token);
        match &user.refresh_token_hash {
            Some(stored) if *stored == presented => {}
            _ => return Err(AuthError::TokenRevoked.into()),
        }

        // 3. Re-check account state; blocking a user kills refresh.
        self.check_account(&user)?;

        // 4. Re-resolve the tenant role when the session was
        //    tenant-scoped; revoked access surfaces here.
        let tenant_id = claims.tenant_id().map_err(WardenError::from)?;
        let subject = self.build_subject(&user, tenant_id).await?;

        // 5. Rotate: new pair, new stored hash.
        let tokens = token::issue_pair(&subject, &self.config).map_err(WardenError::from)?;
        let hash = token::hash_refresh_token(&tokens.refresh_token);
        self.user_repo
            .set_refresh_token_hash(user.id, Some(hash))
            .await?;

        Ok(tokens)
    }

    /// Invalidate the current refresh token (sign-out).
    pub async fn sign_out(&self, user_id: Uuid) -> WardenResult<()> {
        self.user_repo.set_refresh_token_hash(user_id, None).await?;
        info!(user_id = %user_id, "user signed out");
        Ok(())
    }

    /// Validate an access token against live account state.
    ///
    /// The stateless signature check is not enough for request
    /// handling: a user blocked after issuance must be rejected.
    pub async fn validate_access(
        &self,
        access_token: &str,
    ) -> WardenResult<(ValidatedClaims, UserProfile)> {
        let validated =
            token::validate_access_token(access_token, &self.config).map_err(WardenError::from)?;
        let user_id = validated.0.user_id().map_err(WardenError::from)?;

        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(u) => u,
            Err(WardenError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".into()).into());
            }
            Err(e) => return Err(e),
        };
        self.check_account(&user)?;

        Ok((validated, user.profile()))
    }

    fn check_account(&self, user: &User) -> WardenResult<()> {
        if user.is_blocked {
            let reason = user
                .blocked_reason
                .clone()
                .unwrap_or_else(|| "account blocked".into());
            return Err(AuthError::AccountBlocked(reason).into());
        }
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }
        Ok(())
    }

    /// The token subject for a user, with tenant context when a tenant
    /// is requested. A missing or inactive assignment is a hard
    /// failure: tenant-scoped sessions require live access.
    async fn build_subject(
        &self,
        user: &User,
        tenant_id: Option<Uuid>,
    ) -> WardenResult<TokenSubject> {
        let mut subject = TokenSubject {
            user_id: user.id,
            email: user.email.clone(),
            tenant_id: None,
            role_id: None,
            role_slug: None,
        };

        if let Some(tenant_id) = tenant_id {
            let (_, role) = self
                .authorizer
                .resolve_role(user.id, tenant_id)
                .await?
                .ok_or(AuthError::NoTenantAccess)?;
            subject.tenant_id = Some(tenant_id);
            subject.role_id = Some(role.id);
            subject.role_slug = Some(role.slug);
        }

        Ok(subject)
    }
}
