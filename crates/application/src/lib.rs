//! Application services and ports.

#![forbid(unsafe_code)]

mod access_policy_service;
mod actor_ports;
mod grant_admin_ports;
mod grant_admin_service;
mod job_title_policy;
mod scope_ports;
mod scope_service;

#[cfg(test)]
mod testing;

pub use access_policy_service::{AccessDecision, AccessPolicyService};
pub use actor_ports::ActorRepository;
pub use grant_admin_ports::{
    CreateGrantInput, CreateRolePermissionInput, GrantAdminRepository, GrantListEntry,
    GrantListQuery, RolePermissionListEntry,
};
pub use grant_admin_service::GrantAdminService;
pub use job_title_policy::JobTitlePolicy;
pub use scope_ports::{
    GrantCapabilities, GrantRepository, OrganizationRepository, RolePermissionRepository,
};
pub use scope_service::ScopeService;
