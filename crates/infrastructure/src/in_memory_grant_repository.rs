use std::collections::HashMap;

use async_trait::async_trait;
use frequencia_application::{
    GrantAdminRepository, GrantListEntry, GrantListQuery, GrantRepository,
    RolePermissionListEntry, RolePermissionRepository,
};
use frequencia_core::{AppError, AppResult, UserId};
use frequencia_domain::{
    AccessLevel, Grant, GrantId, GrantSource, GrantTarget, RolePermission, RolePermissionId,
    UnifiedGrant,
};
use tokio::sync::RwLock;

/// In-memory grant store covering every grant table and role permissions.
#[derive(Debug, Default)]
pub struct InMemoryGrantRepository {
    level_grants: RwLock<Vec<Grant>>,
    unified_grants: RwLock<HashMap<GrantId, UnifiedGrant>>,
    role_permissions: RwLock<HashMap<RolePermissionId, RolePermission>>,
    usernames: RwLock<HashMap<UserId, String>>,
    target_names: RwLock<HashMap<GrantTarget, String>>,
}

impl InMemoryGrantRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a grant in one of the per-level tables.
    pub async fn save_level_grant(&self, grant: Grant) -> AppResult<()> {
        if grant.source == GrantSource::Unified {
            return Err(AppError::Validation(
                "unified grants are stored through create_unified_grant".to_owned(),
            ));
        }

        let mut level_grants = self.level_grants.write().await;
        level_grants.retain(|stored| {
            !(stored.source == grant.source
                && stored.user_id == grant.user_id
                && stored.target == grant.target)
        });
        level_grants.push(grant);
        Ok(())
    }

    /// Records the login name shown in administrative listings.
    pub async fn register_user(&self, user_id: UserId, username: impl Into<String>) {
        self.usernames.write().await.insert(user_id, username.into());
    }

    /// Records the display name of a grantable entity.
    pub async fn register_target_name(&self, target: GrantTarget, name: impl Into<String>) {
        self.target_names.write().await.insert(target, name.into());
    }

    async fn username(&self, user_id: UserId) -> String {
        self.usernames
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }

    async fn list_entry(&self, grant: &UnifiedGrant) -> GrantListEntry {
        let target_name = self
            .target_names
            .read()
            .await
            .get(&grant.target())
            .cloned()
            .unwrap_or_else(|| grant.target().uuid().to_string());

        GrantListEntry {
            grant_id: grant.id(),
            user_id: grant.user_id(),
            username: self.username(grant.user_id()).await,
            target: grant.target(),
            target_name,
            level: grant.level(),
        }
    }
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn list_grants(&self, source: GrantSource, user_id: UserId) -> AppResult<Vec<Grant>> {
        if source == GrantSource::Unified {
            return Ok(self
                .unified_grants
                .read()
                .await
                .values()
                .filter(|grant| grant.user_id() == user_id)
                .cloned()
                .map(UnifiedGrant::into_grant)
                .collect());
        }

        Ok(self
            .level_grants
            .read()
            .await
            .iter()
            .filter(|grant| grant.source == source && grant.user_id == user_id)
            .copied()
            .collect())
    }

    async fn has_grant_at_level(
        &self,
        source: GrantSource,
        user_id: UserId,
        level: AccessLevel,
    ) -> AppResult<bool> {
        let grants = self.list_grants(source, user_id).await?;
        Ok(grants.iter().any(|grant| grant.level.satisfies(level)))
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryGrantRepository {
    async fn list_role_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RolePermission>> {
        Ok(self
            .role_permissions
            .read()
            .await
            .values()
            .filter(|permission| permission.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GrantAdminRepository for InMemoryGrantRepository {
    async fn create_unified_grant(&self, grant: UnifiedGrant) -> AppResult<UnifiedGrant> {
        let mut unified_grants = self.unified_grants.write().await;
        if unified_grants
            .values()
            .any(|stored| stored.user_id() == grant.user_id() && stored.target() == grant.target())
        {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds a grant on {} '{}'",
                grant.user_id(),
                grant.target().kind().as_str(),
                grant.target().uuid()
            )));
        }

        unified_grants.insert(grant.id(), grant.clone());
        Ok(grant)
    }

    async fn delete_unified_grant(&self, grant_id: GrantId) -> AppResult<()> {
        match self.unified_grants.write().await.remove(&grant_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!(
                "grant '{grant_id}' does not exist"
            ))),
        }
    }

    async fn list_unified_grants(&self, query: GrantListQuery) -> AppResult<Vec<GrantListEntry>> {
        let grants: Vec<UnifiedGrant> =
            self.unified_grants.read().await.values().cloned().collect();

        let mut entries = Vec::with_capacity(grants.len());
        for grant in &grants {
            entries.push(self.list_entry(grant).await);
        }

        let needle = query.search.as_deref().map(str::to_lowercase);
        entries.retain(|entry| {
            needle.as_deref().is_none_or(|needle| {
                entry.username.to_lowercase().contains(needle)
                    || entry.target_name.to_lowercase().contains(needle)
            })
        });
        entries.sort_by(|left, right| {
            left.username
                .cmp(&right.username)
                .then_with(|| left.target_name.cmp(&right.target_name))
        });

        Ok(entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn list_unified_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<GrantListEntry>> {
        let grants: Vec<UnifiedGrant> = self
            .unified_grants
            .read()
            .await
            .values()
            .filter(|grant| grant.user_id() == user_id)
            .cloned()
            .collect();

        let mut entries = Vec::with_capacity(grants.len());
        for grant in &grants {
            entries.push(self.list_entry(grant).await);
        }
        entries.sort_by(|left, right| left.target_name.cmp(&right.target_name));

        Ok(entries)
    }

    async fn create_role_permission(
        &self,
        permission: RolePermission,
    ) -> AppResult<RolePermission> {
        self.role_permissions
            .write()
            .await
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn delete_role_permission(&self, permission_id: RolePermissionId) -> AppResult<()> {
        match self.role_permissions.write().await.remove(&permission_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!(
                "role permission '{permission_id}' does not exist"
            ))),
        }
    }

    async fn list_role_permissions(
        &self,
        query: GrantListQuery,
    ) -> AppResult<Vec<RolePermissionListEntry>> {
        let permissions: Vec<RolePermission> =
            self.role_permissions.read().await.values().cloned().collect();

        let mut entries = Vec::with_capacity(permissions.len());
        for permission in permissions {
            let username = self.username(permission.user_id()).await;
            entries.push(RolePermissionListEntry {
                permission,
                username,
            });
        }

        let needle = query.search.as_deref().map(str::to_lowercase);
        entries.retain(|entry| {
            needle.as_deref().is_none_or(|needle| {
                entry.username.to_lowercase().contains(needle)
                    || entry
                        .permission
                        .job_title()
                        .as_str()
                        .to_lowercase()
                        .contains(needle)
            })
        });
        entries.sort_by(|left, right| {
            left.username.cmp(&right.username).then_with(|| {
                left.permission
                    .job_title()
                    .as_str()
                    .cmp(right.permission.job_title().as_str())
            })
        });

        Ok(entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}
