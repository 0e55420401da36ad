use std::sync::Arc;

use frequencia_core::{Actor, AppError, AppResult};
use frequencia_domain::{Feature, GrantId, GrantTarget, UnifiedGrant};
use tracing::info;

use crate::grant_admin_ports::{
    CreateGrantInput, GrantAdminRepository, GrantListEntry, GrantListQuery,
};
use crate::scope_ports::OrganizationRepository;
use crate::AccessPolicyService;

mod role_permissions;

/// Application service for super-administrator grant management.
#[derive(Clone)]
pub struct GrantAdminService {
    access_policy: AccessPolicyService,
    organization: Arc<dyn OrganizationRepository>,
    repository: Arc<dyn GrantAdminRepository>,
}

impl GrantAdminService {
    /// Creates a grant administration service.
    #[must_use]
    pub fn new(
        access_policy: AccessPolicyService,
        organization: Arc<dyn OrganizationRepository>,
        repository: Arc<dyn GrantAdminRepository>,
    ) -> Self {
        Self {
            access_policy,
            organization,
            repository,
        }
    }

    /// Grants a user a level over exactly one organizational entity.
    pub async fn create_grant(
        &self,
        actor: &Actor,
        input: CreateGrantInput,
    ) -> AppResult<UnifiedGrant> {
        self.access_policy
            .require(actor, Feature::GrantAccess, None)
            .await?;
        self.require_existing_target(input.target).await?;

        let grant = self
            .repository
            .create_unified_grant(UnifiedGrant::new(
                GrantId::new(),
                input.user_id,
                input.target,
                input.level,
            ))
            .await?;

        info!(
            grant_id = %grant.id(),
            user_id = %grant.user_id(),
            target = grant.target().kind().as_str(),
            level = grant.level().as_str(),
            "created unified grant"
        );

        Ok(grant)
    }

    /// Removes a unified grant.
    pub async fn delete_grant(&self, actor: &Actor, grant_id: GrantId) -> AppResult<()> {
        self.access_policy
            .require(actor, Feature::RevokeAccess, None)
            .await?;

        self.repository.delete_unified_grant(grant_id).await?;
        info!(grant_id = %grant_id, "deleted unified grant");
        Ok(())
    }

    /// Lists unified grants with an optional text filter.
    pub async fn list_grants(
        &self,
        actor: &Actor,
        query: GrantListQuery,
    ) -> AppResult<Vec<GrantListEntry>> {
        self.access_policy
            .require(actor, Feature::ManageScopes, None)
            .await?;

        self.repository
            .list_unified_grants(normalize_query(query))
            .await
    }

    /// Lists the unified grants held by the actor.
    pub async fn list_own_grants(&self, actor: &Actor) -> AppResult<Vec<GrantListEntry>> {
        self.access_policy
            .require(actor, Feature::DebugScopes, None)
            .await?;

        self.repository
            .list_unified_grants_for_user(actor.user_id())
            .await
    }

    async fn require_existing_target(&self, target: GrantTarget) -> AppResult<()> {
        let tree = self.organization.load_hierarchy().await?;
        if tree.contains_target(target) {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "{} '{}' does not exist",
            target.kind().as_str(),
            target.uuid()
        )))
    }
}

fn normalize_query(query: GrantListQuery) -> GrantListQuery {
    GrantListQuery {
        search: query
            .search
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty()),
        limit: query.limit.clamp(1, 200),
        offset: query.offset,
    }
}
