use sqlx::PgPool;
use tracing::{info, warn};

use frequencia_application::GrantCapabilities;
use frequencia_core::{AppError, AppResult};

/// Detects which optional grant tables exist in the connected database.
pub async fn detect_grant_capabilities(pool: &PgPool) -> AppResult<GrantCapabilities> {
    let capabilities = GrantCapabilities {
        agency_grants: table_exists(pool, "agency_grants").await?,
        role_permissions: table_exists(pool, "role_permissions").await?,
    };

    if !capabilities.agency_grants {
        warn!("agency_grants table not found; agency-level legacy grants are ignored");
    }
    if !capabilities.role_permissions {
        warn!("role_permissions table not found; falling back to privileged job titles");
    }
    info!(
        agency_grants = capabilities.agency_grants,
        role_permissions = capabilities.role_permissions,
        "grant capabilities detected"
    );

    Ok(capabilities)
}

async fn table_exists(pool: &PgPool, table: &str) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
        .bind(table)
        .fetch_one(pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to inspect table '{table}': {error}"))
        })
}
