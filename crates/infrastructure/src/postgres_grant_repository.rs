use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use frequencia_application::{GrantRepository, RolePermissionRepository};
use frequencia_core::{AppError, AppResult, UserId};
use frequencia_domain::{
    AccessLevel, Grant, GrantSource, GrantTarget, RolePermission, RolePermissionId, TargetKind,
};

mod admin;

/// PostgreSQL-backed reads over every grant table.
#[derive(Clone)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LevelGrantRow {
    target_id: Uuid,
    level: String,
}

#[derive(Debug, FromRow)]
struct UnifiedGrantRow {
    id: Uuid,
    level: String,
    municipality_id: Option<Uuid>,
    department_id: Option<Uuid>,
    agency_id: Option<Uuid>,
    sector_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    id: Uuid,
    user_id: Uuid,
    job_title: String,
    level: String,
    department_id: Option<Uuid>,
    agency_id: Option<Uuid>,
    sector_id: Option<Uuid>,
}

/// Table and target column of a per-level grant source.
fn level_table(source: GrantSource) -> Option<(&'static str, &'static str, TargetKind)> {
    match source {
        GrantSource::LegacyMunicipality => Some((
            "municipality_grants",
            "municipality_id",
            TargetKind::Municipality,
        )),
        GrantSource::LegacyDepartment => {
            Some(("department_grants", "department_id", TargetKind::Department))
        }
        GrantSource::LegacyAgency => Some(("agency_grants", "agency_id", TargetKind::Agency)),
        GrantSource::LegacySector => Some(("sector_grants", "sector_id", TargetKind::Sector)),
        GrantSource::Unified => None,
    }
}

/// Stored level values that satisfy `required`.
fn satisfying_levels(required: AccessLevel) -> Vec<String> {
    [AccessLevel::Read, AccessLevel::Manage]
        .into_iter()
        .filter(|level| level.satisfies(required))
        .map(|level| level.as_str().to_owned())
        .collect()
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn list_grants(&self, source: GrantSource, user_id: UserId) -> AppResult<Vec<Grant>> {
        let Some((table, column, kind)) = level_table(source) else {
            return self.list_unified_grant_rows(user_id).await;
        };

        let rows = sqlx::query_as::<_, LevelGrantRow>(&format!(
            "SELECT {column} AS target_id, level FROM {table} WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load grants from {table}: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let level = parse_stored_level(table, row.target_id, row.level.as_str())?;
                Some(Grant {
                    user_id,
                    target: GrantTarget::from_kind_and_uuid(kind, row.target_id),
                    level,
                    source,
                })
            })
            .collect())
    }

    async fn has_grant_at_level(
        &self,
        source: GrantSource,
        user_id: UserId,
        level: AccessLevel,
    ) -> AppResult<bool> {
        let table = level_table(source)
            .map(|(table, _, _)| table)
            .unwrap_or("user_scope_grants");

        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE user_id = $1 AND level = ANY($2))"
        ))
        .bind(user_id.as_uuid())
        .bind(satisfying_levels(level))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check grants in {table}: {error}"))
        })
    }
}

impl PostgresGrantRepository {
    async fn list_unified_grant_rows(&self, user_id: UserId) -> AppResult<Vec<Grant>> {
        let rows = sqlx::query_as::<_, UnifiedGrantRow>(
            r#"
            SELECT id, level, municipality_id, department_id, agency_id, sector_id
            FROM user_scope_grants
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load unified grants: {error}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let level =
                    parse_stored_level("user_scope_grants", row.id, row.level.as_str())?;
                let target = match GrantTarget::from_columns(
                    row.municipality_id,
                    row.department_id,
                    row.agency_id,
                    row.sector_id,
                ) {
                    Ok(target) => target,
                    Err(error) => {
                        warn!(grant_id = %row.id, %error, "skipping malformed unified grant");
                        return None;
                    }
                };

                Some(Grant {
                    user_id,
                    target,
                    level,
                    source: GrantSource::Unified,
                })
            })
            .collect())
    }
}

/// Rows with an unknown level contribute nothing.
fn parse_stored_level(table: &str, row_id: Uuid, value: &str) -> Option<AccessLevel> {
    match AccessLevel::from_str(value) {
        Ok(level) => Some(level),
        Err(error) => {
            warn!(table, row_id = %row_id, %error, "skipping grant with unknown level");
            None
        }
    }
}

#[async_trait]
impl RolePermissionRepository for PostgresGrantRepository {
    async fn list_role_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RolePermission>> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT id, user_id, job_title, level, department_id, agency_id, sector_id
            FROM role_permissions
            WHERE user_id = $1
            ORDER BY job_title
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load role permissions: {error}"))
        })?;

        rows.into_iter().map(role_permission_from_row).collect()
    }
}

fn role_permission_from_row(row: RolePermissionRow) -> AppResult<RolePermission> {
    let decode = |error: AppError| {
        AppError::Internal(format!(
            "failed to decode role permission '{}': {error}",
            row.id
        ))
    };
    let level = AccessLevel::from_str(row.level.as_str()).map_err(decode)?;

    RolePermission::from_columns(
        RolePermissionId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        row.job_title.as_str(),
        level,
        row.department_id,
        row.agency_id,
        row.sector_id,
    )
    .map_err(decode)
}

/// Maps write failures onto conflicts and validation errors.
fn map_write_error(error: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!("failed to {action}: entry already exists"));
            }
            Some("23503") => {
                return AppError::Validation(format!(
                    "failed to {action}: referenced user or entity does not exist"
                ));
            }
            Some("23514") => {
                return AppError::Validation(format!(
                    "failed to {action}: {}",
                    database_error.message()
                ));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

#[cfg(test)]
mod tests;
