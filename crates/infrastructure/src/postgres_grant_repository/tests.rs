use frequencia_application::{
    GrantAdminRepository, GrantListQuery, GrantRepository, RolePermissionRepository,
};
use frequencia_core::{AppError, UserId};
use frequencia_domain::{
    AccessLevel, DepartmentId, GrantId, GrantSource, GrantTarget, RolePermission,
    RolePermissionId, RoleScopeRestriction, UnifiedGrant,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresGrantRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres grant tests: {error}");
    }

    Some(pool)
}

async fn ensure_user(pool: &PgPool, username: &str) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
        .bind(user_id.as_uuid())
        .bind(format!("{username}-{}", user_id.as_uuid()))
        .execute(pool)
        .await;
    if let Err(error) = insert {
        panic!("failed to seed user '{username}': {error}");
    }
    user_id
}

async fn ensure_department(pool: &PgPool, name: &str) -> DepartmentId {
    let department_id = DepartmentId::new();
    let insert = sqlx::query("INSERT INTO departments (id, name) VALUES ($1, $2)")
        .bind(department_id.as_uuid())
        .bind(format!("{name} {}", department_id.as_uuid()))
        .execute(pool)
        .await;
    if let Err(error) = insert {
        panic!("failed to seed department '{name}': {error}");
    }
    department_id
}

#[tokio::test]
async fn legacy_and_unified_sources_read_through_one_shape() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user_id = ensure_user(&pool, "ana").await;
    let legacy_department = ensure_department(&pool, "Educacao").await;
    let unified_department = ensure_department(&pool, "Saude").await;
    let repository = PostgresGrantRepository::new(pool.clone());

    let legacy_insert = sqlx::query(
        "INSERT INTO department_grants (id, user_id, department_id, level) VALUES ($1, $2, $3, 'read')",
    )
    .bind(Uuid::new_v4())
    .bind(user_id.as_uuid())
    .bind(legacy_department.as_uuid())
    .execute(&pool)
    .await;
    assert!(legacy_insert.is_ok());
    assert!(
        repository
            .create_unified_grant(UnifiedGrant::new(
                GrantId::new(),
                user_id,
                GrantTarget::Department(unified_department),
                AccessLevel::Manage,
            ))
            .await
            .is_ok()
    );

    let legacy = repository
        .list_grants(GrantSource::LegacyDepartment, user_id)
        .await
        .unwrap_or_else(|error| panic!("legacy grant listing failed: {error}"));
    let unified = repository
        .list_grants(GrantSource::Unified, user_id)
        .await
        .unwrap_or_else(|error| panic!("unified grant listing failed: {error}"));

    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].target, GrantTarget::Department(legacy_department));
    assert_eq!(legacy[0].level, AccessLevel::Read);
    assert_eq!(unified.len(), 1);
    assert_eq!(unified[0].target, GrantTarget::Department(unified_department));

    assert_eq!(
        repository
            .has_grant_at_level(GrantSource::LegacyDepartment, user_id, AccessLevel::Manage)
            .await
            .ok(),
        Some(false)
    );
    assert_eq!(
        repository
            .has_grant_at_level(GrantSource::Unified, user_id, AccessLevel::Manage)
            .await
            .ok(),
        Some(true)
    );
}

#[tokio::test]
async fn duplicate_target_is_a_conflict_and_listing_searches_names() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user_id = ensure_user(&pool, "bruno").await;
    let department = ensure_department(&pool, "Obras").await;
    let repository = PostgresGrantRepository::new(pool);
    let grant = |level| {
        UnifiedGrant::new(
            GrantId::new(),
            user_id,
            GrantTarget::Department(department),
            level,
        )
    };

    assert!(repository.create_unified_grant(grant(AccessLevel::Read)).await.is_ok());
    let duplicate = repository
        .create_unified_grant(grant(AccessLevel::Manage))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let listed = repository
        .list_unified_grants(GrantListQuery {
            search: Some(department.as_uuid().to_string()),
            ..GrantListQuery::default()
        })
        .await
        .unwrap_or_else(|error| panic!("grant listing failed: {error}"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].user_id, user_id);
    assert!(listed[0].target_name.starts_with("Obras"));

    assert!(
        repository
            .delete_unified_grant(listed[0].grant_id)
            .await
            .is_ok()
    );
    assert!(matches!(
        repository.delete_unified_grant(listed[0].grant_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn role_permissions_keep_their_restriction() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let user_id = ensure_user(&pool, "carla").await;
    let department = ensure_department(&pool, "Educacao").await;
    let repository = PostgresGrantRepository::new(pool);
    let permission = RolePermission::new(
        RolePermissionId::new(),
        user_id,
        "Professor",
        AccessLevel::Manage,
        Some(RoleScopeRestriction::Department(department)),
    )
    .unwrap_or_else(|error| panic!("invalid role permission: {error}"));

    assert!(repository.create_role_permission(permission.clone()).await.is_ok());

    let stored = repository
        .list_role_permissions_for_user(user_id)
        .await
        .unwrap_or_else(|error| panic!("role permission listing failed: {error}"));
    assert_eq!(stored, vec![permission]);
}
