use std::sync::Arc;

use frequencia_core::AppError;
use frequencia_infrastructure::{
    PostgresActorRepository, PostgresGrantRepository, PostgresOrganizationRepository,
    detect_grant_capabilities,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::{AppState, StateRepositories};

pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let capabilities = detect_grant_capabilities(&pool).await?;

    let grants = Arc::new(PostgresGrantRepository::new(pool.clone()));
    let repositories = StateRepositories {
        organization: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
        grants: grants.clone(),
        role_permissions: grants.clone(),
        grant_admin: grants,
        actors: Arc::new(PostgresActorRepository::new(pool)),
    };

    Ok(AppState::new(
        repositories,
        capabilities,
        config.frontend_url.clone(),
        config.bootstrap_token.clone(),
    ))
}
