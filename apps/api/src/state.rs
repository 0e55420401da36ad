use std::sync::Arc;

use frequencia_application::{
    AccessPolicyService, ActorRepository, GrantAdminRepository, GrantAdminService,
    GrantCapabilities, GrantRepository, JobTitlePolicy, OrganizationRepository,
    RolePermissionRepository, ScopeService,
};

/// Adapters the services are built from.
pub struct StateRepositories {
    pub organization: Arc<dyn OrganizationRepository>,
    pub grants: Arc<dyn GrantRepository>,
    pub role_permissions: Arc<dyn RolePermissionRepository>,
    pub grant_admin: Arc<dyn GrantAdminRepository>,
    pub actors: Arc<dyn ActorRepository>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub scope_service: ScopeService,
    pub access_policy_service: AccessPolicyService,
    pub grant_admin_service: GrantAdminService,
    pub actor_repository: Arc<dyn ActorRepository>,
    pub frontend_url: String,
    pub bootstrap_token: String,
}

impl AppState {
    pub fn new(
        repositories: StateRepositories,
        capabilities: GrantCapabilities,
        frontend_url: String,
        bootstrap_token: String,
    ) -> Self {
        let scope_service = ScopeService::new(
            repositories.organization.clone(),
            repositories.grants.clone(),
            capabilities,
        );
        let access_policy_service = AccessPolicyService::new(
            scope_service.clone(),
            repositories.organization.clone(),
            repositories.grants,
            JobTitlePolicy::from_capabilities(capabilities, repositories.role_permissions),
        );
        let grant_admin_service = GrantAdminService::new(
            access_policy_service.clone(),
            repositories.organization,
            repositories.grant_admin,
        );

        Self {
            scope_service,
            access_policy_service,
            grant_admin_service,
            actor_repository: repositories.actors,
            frontend_url,
            bootstrap_token,
        }
    }
}
