use std::sync::Arc;

use frequencia_core::{Actor, AppResult};
use frequencia_domain::{
    AccessLevel, GrantTarget, OrganizationTree, ResolvedChain, ResolvedScope, ScopeSets,
};
use tracing::debug;

use crate::scope_ports::{GrantCapabilities, GrantRepository, OrganizationRepository};

mod filters;

/// Application service resolving what each user may see and manage.
#[derive(Clone)]
pub struct ScopeService {
    organization: Arc<dyn OrganizationRepository>,
    grants: Arc<dyn GrantRepository>,
    capabilities: GrantCapabilities,
}

impl ScopeService {
    /// Creates a scope service over the given repositories.
    #[must_use]
    pub fn new(
        organization: Arc<dyn OrganizationRepository>,
        grants: Arc<dyn GrantRepository>,
        capabilities: GrantCapabilities,
    ) -> Self {
        Self {
            organization,
            grants,
            capabilities,
        }
    }

    /// Returns the capability flags this service was built with.
    #[must_use]
    pub fn capabilities(&self) -> GrantCapabilities {
        self.capabilities
    }

    /// Resolves the readable scope of an actor.
    pub async fn resolve_scope(&self, actor: &Actor) -> AppResult<ResolvedScope> {
        self.resolve_scope_at(actor, AccessLevel::Read).await
    }

    /// Resolves the scope of an actor for a minimum level.
    pub async fn resolve_scope_at(
        &self,
        actor: &Actor,
        level: AccessLevel,
    ) -> AppResult<ResolvedScope> {
        if actor.is_admin() {
            return Ok(ResolvedScope::Unrestricted);
        }

        let tree = self.organization.load_hierarchy().await?;
        self.resolve_with_tree(actor, level, &tree).await
    }

    pub(crate) async fn resolve_with_tree(
        &self,
        actor: &Actor,
        level: AccessLevel,
        tree: &OrganizationTree,
    ) -> AppResult<ResolvedScope> {
        if actor.is_admin() {
            return Ok(ResolvedScope::Unrestricted);
        }

        let mut sets = ScopeSets::new(level);
        for source in self.capabilities.grant_sources() {
            let grants = self.grants.list_grants(source, actor.user_id()).await?;
            for grant in grants {
                if !grant.level.satisfies(level) {
                    continue;
                }
                sets.grant(grant.target);
                if let Some(chain) = ancestor_chain(tree, grant.target) {
                    sets.expose_ancestors(&chain);
                }
            }
        }

        if level == AccessLevel::Read {
            let employee = self
                .organization
                .find_employee_for_user(actor.user_id())
                .await?;
            if let Some(employee) = employee {
                let target = GrantTarget::Sector(employee.sector_id());
                sets.grant(target);
                if let Some(chain) = ancestor_chain(tree, target) {
                    sets.expose_ancestors(&chain);
                }
            }
        }

        debug!(
            user_id = %actor.user_id(),
            level = level.as_str(),
            granted = sets.granted().len(),
            visible = sets.visible().len(),
            "resolved scope"
        );

        Ok(ResolvedScope::Restricted(sets))
    }
}

fn ancestor_chain(tree: &OrganizationTree, target: GrantTarget) -> Option<ResolvedChain> {
    match target {
        GrantTarget::Municipality(_) => None,
        GrantTarget::Department(id) => tree
            .department(id)
            .map(|department| tree.resolve_department_chain(department)),
        GrantTarget::Agency(id) => tree
            .agency(id)
            .map(|agency| tree.resolve_agency_chain(agency)),
        GrantTarget::Sector(id) => tree
            .sector(id)
            .map(|sector| tree.resolve_sector_chain(sector)),
    }
}
