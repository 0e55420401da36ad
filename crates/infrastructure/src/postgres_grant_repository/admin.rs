use super::*;

use frequencia_application::{
    GrantAdminRepository, GrantListEntry, GrantListQuery, RolePermissionListEntry,
};
use frequencia_domain::{GrantId, RoleScopeRestriction, UnifiedGrant};

#[derive(Debug, FromRow)]
struct GrantListRow {
    id: Uuid,
    user_id: Uuid,
    username: String,
    level: String,
    municipality_id: Option<Uuid>,
    department_id: Option<Uuid>,
    agency_id: Option<Uuid>,
    sector_id: Option<Uuid>,
    target_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct RolePermissionListRow {
    id: Uuid,
    user_id: Uuid,
    job_title: String,
    level: String,
    department_id: Option<Uuid>,
    agency_id: Option<Uuid>,
    sector_id: Option<Uuid>,
    username: String,
}

const GRANT_LIST_SELECT: &str = r#"
    SELECT
        grants.id,
        grants.user_id,
        users.username,
        grants.level,
        grants.municipality_id,
        grants.department_id,
        grants.agency_id,
        grants.sector_id,
        COALESCE(municipalities.name, departments.name, agencies.name, sectors.name) AS target_name
    FROM user_scope_grants AS grants
    INNER JOIN users ON users.id = grants.user_id
    LEFT JOIN municipalities ON municipalities.id = grants.municipality_id
    LEFT JOIN departments ON departments.id = grants.department_id
    LEFT JOIN agencies ON agencies.id = grants.agency_id
    LEFT JOIN sectors ON sectors.id = grants.sector_id
"#;

#[async_trait]
impl GrantAdminRepository for PostgresGrantRepository {
    async fn create_unified_grant(&self, grant: UnifiedGrant) -> AppResult<UnifiedGrant> {
        let (municipality_id, department_id, agency_id, sector_id) = grant.target().to_columns();

        sqlx::query(
            r#"
            INSERT INTO user_scope_grants (
                id, user_id, level, municipality_id, department_id, agency_id, sector_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(grant.id().as_uuid())
        .bind(grant.user_id().as_uuid())
        .bind(grant.level().as_str())
        .bind(municipality_id)
        .bind(department_id)
        .bind(agency_id)
        .bind(sector_id)
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "create unified grant"))?;

        Ok(grant)
    }

    async fn delete_unified_grant(&self, grant_id: GrantId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM user_scope_grants WHERE id = $1")
            .bind(grant_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete grant '{grant_id}': {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "grant '{grant_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn list_unified_grants(&self, query: GrantListQuery) -> AppResult<Vec<GrantListEntry>> {
        let (limit, offset) = page_bounds(&query)?;

        let rows = sqlx::query_as::<_, GrantListRow>(&format!(
            r#"
            {GRANT_LIST_SELECT}
            WHERE $1::TEXT IS NULL
                OR users.username ILIKE $1
                OR users.display_name ILIKE $1
                OR COALESCE(municipalities.name, departments.name, agencies.name, sectors.name) ILIKE $1
            ORDER BY users.username, target_name, grants.id
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(query.search.as_deref().map(like_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list unified grants: {error}")))?;

        rows.into_iter().map(grant_entry_from_row).collect()
    }

    async fn list_unified_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<GrantListEntry>> {
        let rows = sqlx::query_as::<_, GrantListRow>(&format!(
            r#"
            {GRANT_LIST_SELECT}
            WHERE grants.user_id = $1
            ORDER BY target_name, grants.id
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list unified grants for user '{user_id}': {error}"
            ))
        })?;

        rows.into_iter().map(grant_entry_from_row).collect()
    }

    async fn create_role_permission(
        &self,
        permission: RolePermission,
    ) -> AppResult<RolePermission> {
        let (department_id, agency_id, sector_id) = match permission.restriction() {
            None => (None, None, None),
            Some(RoleScopeRestriction::Department(id)) => (Some(id.as_uuid()), None, None),
            Some(RoleScopeRestriction::Agency(id)) => (None, Some(id.as_uuid()), None),
            Some(RoleScopeRestriction::Sector(id)) => (None, None, Some(id.as_uuid())),
        };

        sqlx::query(
            r#"
            INSERT INTO role_permissions (
                id, user_id, job_title, level, department_id, agency_id, sector_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.user_id().as_uuid())
        .bind(permission.job_title().as_str())
        .bind(permission.level().as_str())
        .bind(department_id)
        .bind(agency_id)
        .bind(sector_id)
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "create role permission"))?;

        Ok(permission)
    }

    async fn delete_role_permission(&self, permission_id: RolePermissionId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE id = $1")
            .bind(permission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to delete role permission '{permission_id}': {error}"
                ))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role permission '{permission_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn list_role_permissions(
        &self,
        query: GrantListQuery,
    ) -> AppResult<Vec<RolePermissionListEntry>> {
        let (limit, offset) = page_bounds(&query)?;

        let rows = sqlx::query_as::<_, RolePermissionListRow>(
            r#"
            SELECT
                permissions.id,
                permissions.user_id,
                permissions.job_title,
                permissions.level,
                permissions.department_id,
                permissions.agency_id,
                permissions.sector_id,
                users.username
            FROM role_permissions AS permissions
            INNER JOIN users ON users.id = permissions.user_id
            WHERE $1::TEXT IS NULL
                OR users.username ILIKE $1
                OR permissions.job_title ILIKE $1
            ORDER BY users.username, permissions.job_title, permissions.id
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(query.search.as_deref().map(like_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role permissions: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                let username = row.username;
                role_permission_from_row(RolePermissionRow {
                    id: row.id,
                    user_id: row.user_id,
                    job_title: row.job_title,
                    level: row.level,
                    department_id: row.department_id,
                    agency_id: row.agency_id,
                    sector_id: row.sector_id,
                })
                .map(|permission| RolePermissionListEntry {
                    permission,
                    username,
                })
            })
            .collect()
    }
}

fn page_bounds(query: &GrantListQuery) -> AppResult<(i64, i64)> {
    let limit = i64::try_from(query.limit)
        .map_err(|error| AppError::Validation(format!("invalid listing limit: {error}")))?;
    let offset = i64::try_from(query.offset)
        .map_err(|error| AppError::Validation(format!("invalid listing offset: {error}")))?;

    Ok((limit, offset))
}

/// Builds a case-insensitive substring pattern with LIKE wildcards escaped.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn grant_entry_from_row(row: GrantListRow) -> AppResult<GrantListEntry> {
    let decode = |error: AppError| {
        AppError::Internal(format!("failed to decode grant '{}': {error}", row.id))
    };
    let target = GrantTarget::from_columns(
        row.municipality_id,
        row.department_id,
        row.agency_id,
        row.sector_id,
    )
    .map_err(decode)?;
    let level = AccessLevel::from_str(row.level.as_str()).map_err(decode)?;

    Ok(GrantListEntry {
        grant_id: GrantId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        username: row.username,
        target,
        target_name: row
            .target_name
            .unwrap_or_else(|| target.uuid().to_string()),
        level,
    })
}
