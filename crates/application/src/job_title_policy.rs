use std::sync::Arc;

use frequencia_core::{Actor, AppResult};
use frequencia_domain::{AccessLevel, Employee, ResolvedChain, is_privileged_job_title};

use crate::scope_ports::{GrantCapabilities, OrganizationRepository, RolePermissionRepository};

/// Job-title check applied on top of sector scope when managing an employee.
///
/// Chosen once from the deployment capabilities.
#[derive(Clone)]
pub enum JobTitlePolicy {
    /// Role permission rows decide.
    Explicit(Arc<dyn RolePermissionRepository>),
    /// The acting user's own job title must be privileged.
    PrivilegedTitles,
}

impl JobTitlePolicy {
    /// Picks the policy matching the installed tables.
    #[must_use]
    pub fn from_capabilities(
        capabilities: GrantCapabilities,
        repository: Arc<dyn RolePermissionRepository>,
    ) -> Self {
        if capabilities.role_permissions {
            Self::Explicit(repository)
        } else {
            Self::PrivilegedTitles
        }
    }

    /// Returns whether `actor` may operate on `target` at `required`.
    ///
    /// `chain` is the resolved chain of the target's sector. Targets without a
    /// job title fall back to the privileged-title check.
    pub async fn permits(
        &self,
        actor: &Actor,
        target: &Employee,
        chain: &ResolvedChain,
        required: AccessLevel,
        organization: &dyn OrganizationRepository,
    ) -> AppResult<bool> {
        if let Self::Explicit(repository) = self {
            if !target.job_title().is_empty() {
                let permissions = repository
                    .list_role_permissions_for_user(actor.user_id())
                    .await?;
                return Ok(permissions.iter().any(|permission| {
                    permission.matches_job_title(target.job_title())
                        && permission.applies_to(target.sector_id(), chain)
                        && permission.level().satisfies(required)
                }));
            }
        }

        if required == AccessLevel::Read {
            return Ok(true);
        }

        let own_employee = organization
            .find_employee_for_user(actor.user_id())
            .await?;
        Ok(own_employee.is_some_and(|employee| is_privileged_job_title(employee.job_title())))
    }
}
