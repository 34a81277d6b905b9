//! Integration tests for the User repository using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use warden_core::models::user::{CreateUser, UpdateUser};
use warden_core::repository::{Pagination, UserRepository};
use warden_db::repository::SurrealUserRepository;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();
    db
}

fn create_input(nickname: &str, email: &str) -> CreateUser {
    CreateUser {
        first_name: "Test".into(),
        last_name: "User".into(),
        nickname: nickname.into(),
        email: email.into(),
        password: "SuperSecret123!".into(),
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("alice", "alice@example.com")).await.unwrap();

    assert_eq!(user.nickname, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert!(user.is_active);
    assert!(!user.is_blocked);
    assert!(!user.email_verified);
    assert!(user.refresh_token_hash.is_none());
    assert!(user.last_login_at.is_none());

    // Password must be hashed, never stored in plaintext.
    assert_ne!(user.password_hash, "SuperSecret123!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.nickname, "alice");
}

#[tokio::test]
async fn get_user_by_email_and_nickname() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("bob", "bob@example.com")).await.unwrap();

    let by_email = repo.get_by_email("bob@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);

    let by_nickname = repo.get_by_nickname("bob").await.unwrap();
    assert_eq!(by_nickname.id, user.id);
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(create_input("user-a", "same@example.com")).await.unwrap();

    let result = repo.create(create_input("user-b", "same@example.com")).await;
    assert!(
        matches!(
            result,
            Err(warden_core::error::WardenError::AlreadyExists { .. })
        ),
        "duplicate email should map to AlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn duplicate_nickname_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(create_input("taken", "first@example.com")).await.unwrap();

    let result = repo.create(create_input("taken", "second@example.com")).await;
    assert!(
        matches!(
            result,
            Err(warden_core::error::WardenError::AlreadyExists { .. })
        ),
        "duplicate nickname should map to AlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn hashes_differ_for_same_password() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let a = repo.create(create_input("salt-a", "salt-a@example.com")).await.unwrap();
    let b = repo.create(create_input("salt-b", "salt-b@example.com")).await.unwrap();

    // Same raw password, random salt: hashes must not collide.
    assert_ne!(a.password_hash, b.password_hash);
}

#[tokio::test]
async fn update_user_fields() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("carol", "carol@example.com")).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                first_name: Some("Caroline".into()),
                is_blocked: Some(true),
                blocked_reason: Some(Some("abuse report".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Caroline");
    assert!(updated.is_blocked);
    assert_eq!(updated.blocked_reason.as_deref(), Some("abuse report"));
    assert_eq!(updated.email, "carol@example.com"); // unchanged
}

#[tokio::test]
async fn refresh_token_hash_set_and_clear() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("dave", "dave@example.com")).await.unwrap();

    repo.set_refresh_token_hash(user.id, Some("abc123".into()))
        .await
        .unwrap();
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.refresh_token_hash.as_deref(), Some("abc123"));

    // Storing a new hash replaces the old one.
    repo.set_refresh_token_hash(user.id, Some("def456".into()))
        .await
        .unwrap();
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.refresh_token_hash.as_deref(), Some("def456"));

    // None clears it (sign-out).
    repo.set_refresh_token_hash(user.id, None).await.unwrap();
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(fetched.refresh_token_hash.is_none());
}

#[tokio::test]
async fn refresh_token_hash_for_unknown_user_is_not_found() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let result = repo
        .set_refresh_token_hash(uuid::Uuid::new_v4(), Some("orphan".into()))
        .await;
    assert!(
        matches!(
            result,
            Err(warden_core::error::WardenError::NotFound { .. })
        ),
        "expected NotFound, got {result:?}"
    );
}

#[tokio::test]
async fn record_login_stamps_time_and_ip() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("eve", "eve@example.com")).await.unwrap();

    repo.record_login(user.id, Some("203.0.113.9".into()))
        .await
        .unwrap();

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(fetched.last_login_at.is_some());
    assert_eq!(fetched.last_login_ip.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn soft_delete_deactivates() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("frank", "frank@example.com")).await.unwrap();
    repo.delete(user.id).await.unwrap();

    // The row survives with is_active = false.
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn list_users_with_pagination() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    for i in 0..5 {
        repo.create(create_input(
            &format!("user-{i}"),
            &format!("user-{i}@example.com"),
        ))
        .await
        .unwrap();
    }

    let page1 = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
}
