use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use frequencia_application::ActorRepository;
use frequencia_core::{Actor, AppError, AppResult, UserId};

/// PostgreSQL-backed account lookups for session bootstrap.
#[derive(Clone)]
pub struct PostgresActorRepository {
    pool: PgPool,
}

impl PostgresActorRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActorRow {
    id: Uuid,
    username: String,
    display_name: String,
    is_superuser: bool,
    is_staff: bool,
}

#[async_trait]
impl ActorRepository for PostgresActorRepository {
    async fn find_actor_by_username(&self, username: &str) -> AppResult<Option<Actor>> {
        let row = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT id, username, display_name, is_superuser, is_staff
            FROM users
            WHERE username = $1 AND is_active
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user '{username}': {error}"))
        })?;

        Ok(row.map(|row| {
            let display_name = if row.display_name.trim().is_empty() {
                row.username.clone()
            } else {
                row.display_name
            };

            Actor::new(
                UserId::from_uuid(row.id),
                row.username,
                display_name,
                row.is_superuser,
                row.is_staff,
            )
        }))
    }
}
