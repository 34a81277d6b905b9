//! Integration tests for the full authentication flow using in-memory
//! SurrealDB repositories.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use warden_auth::config::AuthConfig;
use warden_auth::service::{AuthService, SignInInput, SignUpInput};
use warden_auth::{Authorizer, token};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::assignment::CreateAssignment;
use warden_core::models::role::CreateRole;
use warden_core::models::user::{CreateUser, UpdateUser, User};
use warden_core::repository::{
    AssignmentRepository, PaginatedResult, Pagination, RoleRepository, UserRepository,
};
use warden_db::repository::{
    SurrealAssignmentRepository, SurrealRoleRepository, SurrealUserRepository,
};

type TestService = AuthService<
    SurrealUserRepository<Db>,
    SurrealAssignmentRepository<Db>,
    SurrealRoleRepository<Db>,
>;

fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "test-access-secret".into(),
        refresh_token_secret: "test-refresh-secret".into(),
        jwt_issuer: "warden-test".into(),
        min_password_length: 8,
        ..Default::default()
    }
}

async fn setup() -> (Surreal<Db>, TestService) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let service = AuthService::new(
        SurrealUserRepository::new(db.clone()),
        Authorizer::new(
            SurrealAssignmentRepository::new(db.clone()),
            SurrealRoleRepository::new(db.clone()),
        ),
        test_config(),
    );
    (db, service)
}

fn sign_up_input(nickname: &str, email: &str) -> SignUpInput {
    SignUpInput {
        first_name: "Test".into(),
        last_name: "User".into(),
        nickname: nickname.into(),
        email: email.into(),
        password: "CorrectHorse9!".into(),
    }
}

fn sign_in_input(identifier: &str) -> SignInInput {
    SignInInput {
        identifier: identifier.into(),
        password: "CorrectHorse9!".into(),
        tenant_id: None,
        ip_address: Some("198.51.100.7".into()),
    }
}

/// Grant a role in a tenant directly through the repositories.
async fn grant_role(db: &Surreal<Db>, user_id: Uuid, tenant_id: Uuid, slug: &str) -> Uuid {
    let role_repo = SurrealRoleRepository::new(db.clone());
    let role = role_repo
        .create(CreateRole {
            name: format!("Role {slug}"),
            slug: slug.into(),
            description: None,
            level: 10,
            permissions: vec!["users.read".into()],
            is_system_role: false,
        })
        .await
        .unwrap();

    let assignment_repo = SurrealAssignmentRepository::new(db.clone());
    assignment_repo
        .create(CreateAssignment {
            user_id,
            tenant_id,
            role_id: role.id,
            additional_permissions: vec![],
            denied_permissions: vec![],
            starts_at: None,
            expires_at: None,
            assigned_by: None,
            notes: None,
        })
        .await
        .unwrap();

    role.id
}

#[tokio::test]
async fn sign_up_then_sign_in() {
    let (db, service) = setup().await;

    let profile = service
        .sign_up(sign_up_input("alice", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(profile.nickname, "alice");

    let out = service.sign_in(sign_in_input("alice@example.com")).await.unwrap();
    assert_eq!(out.profile.email, "alice@example.com");
    assert!(!out.tokens.access_token.is_empty());
    assert!(!out.tokens.refresh_token.is_empty());

    // The stored hash matches the issued refresh token.
    let user = SurrealUserRepository::new(db)
        .get_by_id(profile.id)
        .await
        .unwrap();
    assert_eq!(
        user.refresh_token_hash.as_deref(),
        Some(token::hash_refresh_token(&out.tokens.refresh_token).as_str())
    );
    assert!(user.last_login_at.is_some());
    assert_eq!(user.last_login_ip.as_deref(), Some("198.51.100.7"));
}

#[tokio::test]
async fn sign_in_by_nickname() {
    let (_db, service) = setup().await;
    service
        .sign_up(sign_up_input("bob", "bob@example.com"))
        .await
        .unwrap();

    let out = service.sign_in(sign_in_input("bob")).await.unwrap();
    assert_eq!(out.profile.nickname, "bob");
}

#[tokio::test]
async fn sign_up_rejects_short_password() {
    let (_db, service) = setup().await;

    let result = service
        .sign_up(SignUpInput {
            password: "short".into(),
            ..sign_up_input("carol", "carol@example.com")
        })
        .await;
    assert!(matches!(result, Err(WardenError::Validation { .. })));
}

#[tokio::test]
async fn duplicate_sign_up_conflicts() {
    let (_db, service) = setup().await;
    service
        .sign_up(sign_up_input("dup", "dup@example.com"))
        .await
        .unwrap();

    let result = service.sign_up(sign_up_input("dup", "other@example.com")).await;
    assert!(matches!(result, Err(WardenError::AlreadyExists { .. })));
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let (_db, service) = setup().await;
    service
        .sign_up(sign_up_input("dave", "dave@example.com"))
        .await
        .unwrap();

    let unknown = service.sign_in(sign_in_input("ghost@example.com")).await;
    let wrong = service
        .sign_in(SignInInput {
            password: "WrongPassword1!".into(),
            ..sign_in_input("dave@example.com")
        })
        .await;

    let reason_of = |r: Result<warden_auth::service::SignInOutput, WardenError>| match r {
        Err(WardenError::AuthenticationFailed { reason }) => reason,
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    };
    assert_eq!(reason_of(unknown), reason_of(wrong));
}

#[tokio::test]
async fn blocked_account_surfaces_reason() {
    let (db, service) = setup().await;
    let profile = service
        .sign_up(sign_up_input("eve", "eve@example.com"))
        .await
        .unwrap();

    let user_repo = SurrealUserRepository::new(db);
    user_repo
        .update(
            profile.id,
            warden_core::models::user::UpdateUser {
                is_blocked: Some(true),
                blocked_reason: Some(Some("payment fraud".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = service.sign_in(sign_in_input("eve@example.com")).await;
    match result {
        Err(WardenError::AuthenticationFailed { reason }) => {
            assert!(reason.contains("payment fraud"));
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn tenant_scoped_sign_in_requires_assignment() {
    let (db, service) = setup().await;
    let profile = service
        .sign_up(sign_up_input("frank", "frank@example.com"))
        .await
        .unwrap();
    let tenant_id = Uuid::new_v4();

    // No assignment yet: tenant-scoped sign-in fails.
    let result = service
        .sign_in(SignInInput {
            tenant_id: Some(tenant_id),
            ..sign_in_input("frank@example.com")
        })
        .await;
    assert!(matches!(
        result,
        Err(WardenError::AuthenticationFailed { .. })
    ));

    // With a role granted, the token carries the tenant context.
    let role_id = grant_role(&db, profile.id, tenant_id, "member").await;
    let out = service
        .sign_in(SignInInput {
            tenant_id: Some(tenant_id),
            ..sign_in_input("frank@example.com")
        })
        .await
        .unwrap();

    let claims = token::decode_access_token(&out.tokens.access_token, &test_config()).unwrap();
    assert_eq!(claims.tenant_id, Some(tenant_id.to_string()));
    assert_eq!(claims.role_id, Some(role_id.to_string()));
    assert_eq!(claims.role_slug.as_deref(), Some("member"));
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let (_db, service) = setup().await;
    service
        .sign_up(sign_up_input("grace", "grace@example.com"))
        .await
        .unwrap();
    let out = service.sign_in(sign_in_input("grace@example.com")).await.unwrap();

    let rotated = service.refresh(&out.tokens.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, out.tokens.refresh_token);

    // The consumed token no longer matches the stored hash.
    let replay = service.refresh(&out.tokens.refresh_token).await;
    assert!(matches!(
        replay,
        Err(WardenError::AuthenticationFailed { .. })
    ));

    // The rotated token keeps working.
    service.refresh(&rotated.refresh_token).await.unwrap();
}

#[tokio::test]
async fn refresh_rejects_garbage_and_access_tokens() {
    let (_db, service) = setup().await;
    service
        .sign_up(sign_up_input("henry", "henry@example.com"))
        .await
        .unwrap();
    let out = service.sign_in(sign_in_input("henry@example.com")).await.unwrap();

    assert!(service.refresh("not-a-jwt").await.is_err());
    // An access token is signed with the wrong secret for refresh.
    assert!(service.refresh(&out.tokens.access_token).await.is_err());
}

#[tokio::test]
async fn refresh_rechecks_tenant_access() {
    let (db, service) = setup().await;
    let profile = service
        .sign_up(sign_up_input("iris", "iris@example.com"))
        .await
        .unwrap();
    let tenant_id = Uuid::new_v4();
    grant_role(&db, profile.id, tenant_id, "analyst").await;

    let out = service
        .sign_in(SignInInput {
            tenant_id: Some(tenant_id),
            ..sign_in_input("iris@example.com")
        })
        .await
        .unwrap();

    // Revoke the tenant role mid-session.
    let assignment_repo = SurrealAssignmentRepository::new(db);
    let assignment = assignment_repo
        .find_for_user_in_tenant(profile.id, tenant_id)
        .await
        .unwrap()
        .unwrap();
    assignment_repo.revoke(assignment.id, None).await.unwrap();

    let result = service.refresh(&out.tokens.refresh_token).await;
    assert!(
        matches!(result, Err(WardenError::AuthenticationFailed { .. })),
        "revoked tenant access must end the session at refresh time"
    );
}

#[tokio::test]
async fn sign_out_invalidates_refresh() {
    let (_db, service) = setup().await;
    let profile = service
        .sign_up(sign_up_input("jack", "jack@example.com"))
        .await
        .unwrap();
    let out = service.sign_in(sign_in_input("jack@example.com")).await.unwrap();

    service.sign_out(profile.id).await.unwrap();

    let result = service.refresh(&out.tokens.refresh_token).await;
    assert!(matches!(
        result,
        Err(WardenError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn validate_access_checks_live_state() {
    let (db, service) = setup().await;
    let profile = service
        .sign_up(sign_up_input("kate", "kate@example.com"))
        .await
        .unwrap();
    let out = service.sign_in(sign_in_input("kate@example.com")).await.unwrap();

    let (claims, validated_profile) = service
        .validate_access(&out.tokens.access_token)
        .await
        .unwrap();
    assert_eq!(claims.0.email, "kate@example.com");
    assert_eq!(validated_profile.id, profile.id);

    // Block the user: the still-unexpired token stops validating.
    SurrealUserRepository::new(db)
        .update(
            profile.id,
            warden_core::models::user::UpdateUser {
                is_blocked: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = service.validate_access(&out.tokens.access_token).await;
    assert!(matches!(
        result,
        Err(WardenError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn expired_assignment_blocks_tenant_sign_in() {
    let (db, service) = setup().await;
    let profile = service
        .sign_up(sign_up_input("liam", "liam@example.com"))
        .await
        .unwrap();
    let tenant_id = Uuid::new_v4();

    let role_repo = SurrealRoleRepository::new(db.clone());
    let role = role_repo
        .create(CreateRole {
            name: "Contractor".into(),
            slug: "contractor".into(),
            description: None,
            level: 5,
            permissions: vec![],
            is_system_role: false,
        })
        .await
        .unwrap();

    SurrealAssignmentRepository::new(db)
        .create(CreateAssignment {
            user_id: profile.id,
            tenant_id,
            role_id: role.id,
            additional_permissions: vec![],
            denied_permissions: vec![],
            starts_at: None,
            expires_at: Some(Utc::now() - Duration::days(1)),
            assigned_by: None,
            notes: None,
        })
        .await
        .unwrap();

    let result = service
        .sign_in(SignInInput {
            tenant_id: Some(tenant_id),
            ..sign_in_input("liam@example.com")
        })
        .await;
    assert!(matches!(
        result,
        Err(WardenError::AuthenticationFailed { .. })
    ));
}

/// Delegates to the real repository but fails the login stamp, the way
/// a transient store error at step 6 would.
struct StampFailingRepo(SurrealUserRepository<Db>);

impl UserRepository for StampFailingRepo {
    async fn create(&self, input: CreateUser) -> WardenResult<User> {
        self.0.create(input).await
    }

    async fn get_by_id(&self, id: Uuid) -> WardenResult<User> {
        self.0.get_by_id(id).await
    }

    async fn get_by_email(&self, email: &str) -> WardenResult<User> {
        self.0.get_by_email(email).await
    }

    async fn get_by_nickname(&self, nickname: &str) -> WardenResult<User> {
        self.0.get_by_nickname(nickname).await
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> WardenResult<User> {
        self.0.update(id, input).await
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> WardenResult<()> {
        self.0.set_refresh_token_hash(id, hash).await
    }

    async fn record_login(&self, _id: Uuid, _ip: Option<String>) -> WardenResult<()> {
        Err(WardenError::Database("connection reset".into()))
    }

    async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.0.delete(id).await
    }

    async fn list(&self, pagination: Pagination) -> WardenResult<PaginatedResult<User>> {
        self.0.list(pagination).await
    }
}

#[tokio::test]
async fn sign_in_survives_login_stamp_failure() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let service = AuthService::new(
        StampFailingRepo(SurrealUserRepository::new(db.clone())),
        Authorizer::new(
            SurrealAssignmentRepository::new(db.clone()),
            SurrealRoleRepository::new(db.clone()),
        ),
        test_config(),
    );

    let profile = service
        .sign_up(sign_up_input("mona", "mona@example.com"))
        .await
        .unwrap();
    let out = service.sign_in(sign_in_input("mona@example.com")).await.unwrap();

    // The issued pair is fully usable even though the stamp never
    // landed, and the persisted refresh hash rotates as usual.
    service.refresh(&out.tokens.refresh_token).await.unwrap();

    let user = SurrealUserRepository::new(db).get_by_id(profile.id).await.unwrap();
    assert!(user.last_login_at.is_none());
}
