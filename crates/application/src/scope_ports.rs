use async_trait::async_trait;

use frequencia_core::{AppResult, UserId};
use frequencia_domain::{
    AccessLevel, Employee, EmployeeId, Grant, GrantSource, OrganizationTree, RolePermission,
    ScopeFilter, Sector, Timesheet, WorkSchedule,
};

/// Repository port for organization reads and scoped listings.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Loads municipalities, departments, agencies and sectors.
    ///
    /// Implementations may omit employees from the snapshot; single employees
    /// are read through [`OrganizationRepository::find_employee`].
    async fn load_hierarchy(&self) -> AppResult<OrganizationTree>;

    /// Finds one employee by id.
    async fn find_employee(&self, employee_id: EmployeeId) -> AppResult<Option<Employee>>;

    /// Finds the employee linked to a login account.
    async fn find_employee_for_user(&self, user_id: UserId) -> AppResult<Option<Employee>>;

    /// Lists sectors passing the filter, without duplicates.
    async fn list_sectors(&self, filter: &ScopeFilter) -> AppResult<Vec<Sector>>;

    /// Lists employees passing the filter, without duplicates.
    async fn list_employees(&self, filter: &ScopeFilter) -> AppResult<Vec<Employee>>;

    /// Lists timesheets passing the filter, without duplicates.
    async fn list_timesheets(&self, filter: &ScopeFilter) -> AppResult<Vec<Timesheet>>;

    /// Lists work schedules passing the filter, without duplicates.
    async fn list_work_schedules(&self, filter: &ScopeFilter) -> AppResult<Vec<WorkSchedule>>;
}

/// Repository port adapting every grant table to the normalized grant shape.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Lists the grants of one user stored in `source`.
    async fn list_grants(&self, source: GrantSource, user_id: UserId) -> AppResult<Vec<Grant>>;

    /// Returns whether `source` holds any grant of the user at `level` or above.
    async fn has_grant_at_level(
        &self,
        source: GrantSource,
        user_id: UserId,
        level: AccessLevel,
    ) -> AppResult<bool>;
}

/// Repository port for job-title role permissions.
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Lists every role permission held by a user.
    async fn list_role_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RolePermission>>;
}

/// Optional grant tables present in the current deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantCapabilities {
    /// Per-level agency grant table exists.
    pub agency_grants: bool,
    /// Role permission table exists.
    pub role_permissions: bool,
}

impl GrantCapabilities {
    /// Every optional table available.
    #[must_use]
    pub fn full() -> Self {
        Self {
            agency_grants: true,
            role_permissions: true,
        }
    }

    /// Returns the grant sources the resolver reads, in accumulation order.
    #[must_use]
    pub fn grant_sources(&self) -> Vec<GrantSource> {
        let mut sources = vec![
            GrantSource::Unified,
            GrantSource::LegacyMunicipality,
            GrantSource::LegacyDepartment,
        ];
        if self.agency_grants {
            sources.push(GrantSource::LegacyAgency);
        }
        sources.push(GrantSource::LegacySector);
        sources
    }
}
