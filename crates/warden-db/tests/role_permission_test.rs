//! Integration tests for the Role and Permission repositories.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use warden_core::error::WardenError;
use warden_core::models::permission::{CreatePermission, UpdatePermission};
use warden_core::models::role::{CreateRole, UpdateRole};
use warden_core::repository::{Pagination, PermissionRepository, RoleRepository};
use warden_db::repository::{SurrealPermissionRepository, SurrealRoleRepository};

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();
    db
}

fn role_input(name: &str, slug: &str, system: bool) -> CreateRole {
    CreateRole {
        name: name.into(),
        slug: slug.into(),
        description: None,
        level: 10,
        permissions: vec!["users.read".into(), "users.create".into()],
        is_system_role: system,
    }
}

#[tokio::test]
async fn create_and_get_role() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let role = repo.create(role_input("Editor", "editor", false)).await.unwrap();
    assert_eq!(role.name, "Editor");
    assert_eq!(role.level, 10);
    assert_eq!(role.permissions.len(), 2);
    assert!(role.is_active);
    assert!(!role.is_system_role);

    let fetched = repo.get_by_slug("editor").await.unwrap();
    assert_eq!(fetched.id, role.id);
}

#[tokio::test]
async fn duplicate_role_slug_rejected() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    repo.create(role_input("First", "dup", false)).await.unwrap();
    let result = repo.create(role_input("Second", "dup", false)).await;
    assert!(matches!(result, Err(WardenError::AlreadyExists { .. })));
}

#[tokio::test]
async fn update_role_permissions() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let role = repo.create(role_input("Mutable", "mutable", false)).await.unwrap();

    let updated = repo
        .update(
            role.id,
            UpdateRole {
                permissions: Some(vec!["reports.view".into()]),
                level: Some(25),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.permissions, vec!["reports.view".to_string()]);
    assert_eq!(updated.level, 25);
    assert_eq!(updated.slug, "mutable"); // immutable
}

#[tokio::test]
async fn system_role_cannot_be_renamed() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let role = repo
        .create(role_input("Super Admin", "super-admin", true))
        .await
        .unwrap();

    let result = repo
        .update(
            role.id,
            UpdateRole {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(WardenError::Validation { .. })));

    // Non-name updates to a system role are still allowed.
    let updated = repo
        .update(
            role.id,
            UpdateRole {
                permissions: Some(vec!["*".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.permissions, vec!["*".to_string()]);
}

#[tokio::test]
async fn system_role_cannot_be_deleted() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let system = repo
        .create(role_input("Protected", "protected", true))
        .await
        .unwrap();
    let plain = repo
        .create(role_input("Disposable", "disposable", false))
        .await
        .unwrap();

    let result = repo.delete(system.id).await;
    assert!(matches!(result, Err(WardenError::Validation { .. })));
    assert!(repo.get_by_id(system.id).await.is_ok());

    repo.delete(plain.id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(plain.id).await,
        Err(WardenError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_roles_ordered_by_level() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    repo.create(CreateRole {
        level: 5,
        ..role_input("Low", "low", false)
    })
    .await
    .unwrap();
    repo.create(CreateRole {
        level: 100,
        ..role_input("High", "high", false)
    })
    .await
    .unwrap();

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].slug, "high");
    assert_eq!(page.items[1].slug, "low");
}

#[tokio::test]
async fn permission_catalog_crud() {
    let db = setup().await;
    let repo = SurrealPermissionRepository::new(db);

    let perm = repo
        .create(CreatePermission {
            key: "users.create".into(),
            description: "Create user accounts".into(),
            group: "Users".into(),
        })
        .await
        .unwrap();
    assert_eq!(perm.key, "users.create");
    assert_eq!(perm.group, "Users");

    let fetched = repo.get_by_key("users.create").await.unwrap();
    assert_eq!(fetched.id, perm.id);

    let updated = repo
        .update(
            perm.id,
            UpdatePermission {
                description: Some("Create accounts".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Create accounts");
    assert_eq!(updated.group, "Users"); // unchanged

    repo.delete(perm.id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(perm.id).await,
        Err(WardenError::NotFound { .. })
    ));
}

#[tokio::test]
async fn duplicate_permission_key_rejected() {
    let db = setup().await;
    let repo = SurrealPermissionRepository::new(db);

    repo.create(CreatePermission {
        key: "reports.view".into(),
        description: "View reports".into(),
        group: "Reports".into(),
    })
    .await
    .unwrap();

    let result = repo
        .create(CreatePermission {
            key: "reports.view".into(),
            description: "Duplicate".into(),
            group: "Reports".into(),
        })
        .await;
    assert!(matches!(result, Err(WardenError::AlreadyExists { .. })));
}
