use async_trait::async_trait;

use frequencia_core::{AppResult, UserId};
use frequencia_domain::{
    AccessLevel, GrantId, GrantTarget, RolePermission, RolePermissionId, RoleScopeRestriction,
    UnifiedGrant,
};

/// Query parameters for administrative listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantListQuery {
    /// Optional case-insensitive text matched against user and entity names.
    pub search: Option<String>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl Default for GrantListQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Unified grant projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantListEntry {
    /// Grant row identifier.
    pub grant_id: GrantId,
    /// Grantee.
    pub user_id: UserId,
    /// Grantee login name.
    pub username: String,
    /// Granted entity.
    pub target: GrantTarget,
    /// Display name of the granted entity.
    pub target_name: String,
    /// Granted level.
    pub level: AccessLevel,
}

/// Input payload for creating unified grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateGrantInput {
    /// Grantee.
    pub user_id: UserId,
    /// Granted entity.
    pub target: GrantTarget,
    /// Granted level.
    pub level: AccessLevel,
}

/// Role permission projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionListEntry {
    /// Stored permission.
    pub permission: RolePermission,
    /// Grantee login name.
    pub username: String,
}

/// Input payload for creating role permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRolePermissionInput {
    /// Grantee.
    pub user_id: UserId,
    /// Job title the permission applies to.
    pub job_title: String,
    /// Granted level.
    pub level: AccessLevel,
    /// Optional organizational restriction.
    pub restriction: Option<RoleScopeRestriction>,
}

/// Repository port for grant administration.
#[async_trait]
pub trait GrantAdminRepository: Send + Sync {
    /// Stores a unified grant. Returns a conflict when the user already holds the target.
    async fn create_unified_grant(&self, grant: UnifiedGrant) -> AppResult<UnifiedGrant>;

    /// Deletes a unified grant by id.
    async fn delete_unified_grant(&self, grant_id: GrantId) -> AppResult<()>;

    /// Lists unified grants ordered by username.
    async fn list_unified_grants(&self, query: GrantListQuery) -> AppResult<Vec<GrantListEntry>>;

    /// Lists the unified grants of one user.
    async fn list_unified_grants_for_user(&self, user_id: UserId)
    -> AppResult<Vec<GrantListEntry>>;

    /// Stores a role permission.
    async fn create_role_permission(&self, permission: RolePermission)
    -> AppResult<RolePermission>;

    /// Deletes a role permission by id.
    async fn delete_role_permission(&self, permission_id: RolePermissionId) -> AppResult<()>;

    /// Lists role permissions; the text filter matches usernames and job titles.
    async fn list_role_permissions(
        &self,
        query: GrantListQuery,
    ) -> AppResult<Vec<RolePermissionListEntry>>;
}
