//! Fakes shared by service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use frequencia_core::{Actor, AppError, AppResult, UserId};
use frequencia_domain::{
    AccessLevel, Agency, AgencyId, Department, DepartmentId, Employee, EmployeeId, Grant,
    GrantId, GrantSource, GrantTarget, Municipality, MunicipalityId, OrganizationTree,
    RolePermission, RolePermissionId, ScopeFilter, Sector, SectorId, SectorParent, Timesheet,
    UnifiedGrant, WorkSchedule,
};

use crate::grant_admin_ports::{
    GrantAdminRepository, GrantListEntry, GrantListQuery, RolePermissionListEntry,
};
use crate::scope_ports::{GrantRepository, OrganizationRepository, RolePermissionRepository};

pub(crate) struct FakeOrganizationRepository {
    pub(crate) tree: OrganizationTree,
    pub(crate) timesheets: Vec<Timesheet>,
    pub(crate) work_schedules: Vec<WorkSchedule>,
}

#[async_trait]
impl OrganizationRepository for FakeOrganizationRepository {
    async fn load_hierarchy(&self) -> AppResult<OrganizationTree> {
        Ok(self.tree.clone())
    }

    async fn find_employee(&self, employee_id: EmployeeId) -> AppResult<Option<Employee>> {
        Ok(self.tree.employee(employee_id).cloned())
    }

    async fn find_employee_for_user(&self, user_id: UserId) -> AppResult<Option<Employee>> {
        Ok(self.tree.employee_for_user(user_id).cloned())
    }

    async fn list_sectors(&self, filter: &ScopeFilter) -> AppResult<Vec<Sector>> {
        Ok(filter.apply(&self.tree, self.tree.sectors().cloned().collect()))
    }

    async fn list_employees(&self, filter: &ScopeFilter) -> AppResult<Vec<Employee>> {
        Ok(filter.apply(&self.tree, self.tree.employees().cloned().collect()))
    }

    async fn list_timesheets(&self, filter: &ScopeFilter) -> AppResult<Vec<Timesheet>> {
        Ok(filter.apply(&self.tree, self.timesheets.clone()))
    }

    async fn list_work_schedules(&self, filter: &ScopeFilter) -> AppResult<Vec<WorkSchedule>> {
        Ok(filter.apply(&self.tree, self.work_schedules.clone()))
    }
}

#[derive(Default)]
pub(crate) struct FakeGrantRepository {
    pub(crate) grants: Mutex<Vec<Grant>>,
}

impl FakeGrantRepository {
    pub(crate) fn with_grants(grants: Vec<Grant>) -> Self {
        Self {
            grants: Mutex::new(grants),
        }
    }
}

#[async_trait]
impl GrantRepository for FakeGrantRepository {
    async fn list_grants(&self, source: GrantSource, user_id: UserId) -> AppResult<Vec<Grant>> {
        Ok(self
            .grants
            .lock()
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
        Ok(self.grants.lock().await.iter().any(|grant| {
            grant.source == source && grant.user_id == user_id && grant.level.satisfies(level)
        }))
    }
}

#[derive(Default)]
pub(crate) struct FakeRolePermissionRepository {
    pub(crate) permissions: Vec<RolePermission>,
}

#[async_trait]
impl RolePermissionRepository for FakeRolePermissionRepository {
    async fn list_role_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RolePermission>> {
        Ok(self
            .permissions
            .iter()
            .filter(|permission| permission.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeGrantAdminRepository {
    pub(crate) grants: Mutex<HashMap<GrantId, UnifiedGrant>>,
    pub(crate) role_permissions: Mutex<HashMap<RolePermissionId, RolePermission>>,
}

#[async_trait]
impl GrantAdminRepository for FakeGrantAdminRepository {
    async fn create_unified_grant(&self, grant: UnifiedGrant) -> AppResult<UnifiedGrant> {
        let mut grants = self.grants.lock().await;
        if grants
            .values()
            .any(|stored| stored.user_id() == grant.user_id() && stored.target() == grant.target())
        {
            return Err(AppError::Conflict("grant already exists".to_owned()));
        }
        grants.insert(grant.id(), grant.clone());
        Ok(grant)
    }

    async fn delete_unified_grant(&self, grant_id: GrantId) -> AppResult<()> {
        self.grants
            .lock()
            .await
            .remove(&grant_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("grant '{grant_id}' does not exist")))
    }

    async fn list_unified_grants(&self, query: GrantListQuery) -> AppResult<Vec<GrantListEntry>> {
        Ok(self
            .grants
            .lock()
            .await
            .values()
            .map(entry_for)
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn list_unified_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<GrantListEntry>> {
        Ok(self
            .grants
            .lock()
            .await
            .values()
            .filter(|grant| grant.user_id() == user_id)
            .map(entry_for)
            .collect())
    }

    async fn create_role_permission(
        &self,
        permission: RolePermission,
    ) -> AppResult<RolePermission> {
        self.role_permissions
            .lock()
            .await
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn delete_role_permission(&self, permission_id: RolePermissionId) -> AppResult<()> {
        self.role_permissions
            .lock()
            .await
            .remove(&permission_id)
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("role permission '{permission_id}' does not exist"))
            })
    }

    async fn list_role_permissions(
        &self,
        query: GrantListQuery,
    ) -> AppResult<Vec<RolePermissionListEntry>> {
        Ok(self
            .role_permissions
            .lock()
            .await
            .values()
            .skip(query.offset)
            .take(query.limit)
            .map(|permission| RolePermissionListEntry {
                permission: permission.clone(),
                username: permission.user_id().to_string(),
            })
            .collect())
    }
}

fn entry_for(grant: &UnifiedGrant) -> GrantListEntry {
    GrantListEntry {
        grant_id: grant.id(),
        user_id: grant.user_id(),
        username: grant.user_id().to_string(),
        target: grant.target(),
        target_name: grant.target().uuid().to_string(),
        level: grant.level(),
    }
}

/// Two municipalities with one department each.
///
/// `d0` under `municipality` holds `direct_sector` directly and
/// `agency_sector` through `agency`; `d1` under `other_municipality` holds
/// `sibling_sector`.
pub(crate) struct Organization {
    pub(crate) tree: OrganizationTree,
    pub(crate) municipality: MunicipalityId,
    pub(crate) other_municipality: MunicipalityId,
    pub(crate) department: DepartmentId,
    pub(crate) sibling_department: DepartmentId,
    pub(crate) agency: AgencyId,
    pub(crate) direct_sector: SectorId,
    pub(crate) agency_sector: SectorId,
    pub(crate) sibling_sector: SectorId,
    pub(crate) coordinator: EmployeeId,
    pub(crate) professor: EmployeeId,
    pub(crate) sibling_employee: EmployeeId,
}

impl Organization {
    pub(crate) fn new() -> Self {
        let municipality = MunicipalityId::new();
        let other_municipality = MunicipalityId::new();
        let department = DepartmentId::new();
        let sibling_department = DepartmentId::new();
        let agency = AgencyId::new();
        let direct_sector = SectorId::new();
        let agency_sector = SectorId::new();
        let sibling_sector = SectorId::new();
        let coordinator = EmployeeId::new();
        let professor = EmployeeId::new();
        let sibling_employee = EmployeeId::new();

        let mut tree = OrganizationTree::new();
        tree.insert_municipality(
            Municipality::new(municipality, "Prefeitura Municipal", None)
                .unwrap_or_else(|_| unreachable!()),
        );
        tree.insert_municipality(
            Municipality::new(other_municipality, "Prefeitura Vizinha", None)
                .unwrap_or_else(|_| unreachable!()),
        );
        tree.insert_department(
            Department::new(department, "Educacao", municipality).unwrap_or_else(|_| unreachable!()),
        );
        tree.insert_department(
            Department::new(sibling_department, "Saude", other_municipality)
                .unwrap_or_else(|_| unreachable!()),
        );
        tree.insert_agency(
            Agency::new(agency, "Escola Central", department).unwrap_or_else(|_| unreachable!()),
        );
        for (id, name, parent) in [
            (direct_sector, "Gabinete", SectorParent::Department(department)),
            (agency_sector, "Secretaria Escolar", SectorParent::Agency(agency)),
            (sibling_sector, "Posto Central", SectorParent::Department(sibling_department)),
        ] {
            tree.insert_sector(Sector::new(id, name, parent).unwrap_or_else(|_| unreachable!()));
        }
        for (id, sector_id, name, job_title) in [
            (coordinator, direct_sector, "Carla", "Coordinator"),
            (professor, agency_sector, "Tiago", "Professor"),
            (sibling_employee, sibling_sector, "Sara", "Enfermeira"),
        ] {
            let employee = Employee::new(id, sector_id, name, id.to_string(), job_title)
                .unwrap_or_else(|_| unreachable!());
            assert!(tree.insert_employee(employee).is_ok());
        }

        Self {
            tree,
            municipality,
            other_municipality,
            department,
            sibling_department,
            agency,
            direct_sector,
            agency_sector,
            sibling_sector,
            coordinator,
            professor,
            sibling_employee,
        }
    }

    /// Links a new employee in `sector_id` to `user_id`.
    pub(crate) fn link_user(&mut self, user_id: UserId, sector_id: SectorId, job_title: &str) {
        let employee = Employee::new(EmployeeId::new(), sector_id, "Usuario", "999", job_title)
            .unwrap_or_else(|_| unreachable!())
            .with_user(Some(user_id));
        assert!(self.tree.insert_employee(employee).is_ok());
    }

    pub(crate) fn repository(&self) -> FakeOrganizationRepository {
        FakeOrganizationRepository {
            tree: self.tree.clone(),
            timesheets: Vec::new(),
            work_schedules: Vec::new(),
        }
    }
}

pub(crate) fn user(username: &str) -> Actor {
    Actor::new(UserId::new(), username, username, false, false)
}

pub(crate) fn superuser() -> Actor {
    Actor::new(UserId::new(), "root", "Root", true, true)
}

pub(crate) fn staff() -> Actor {
    Actor::new(UserId::new(), "staff", "Staff", false, true)
}

pub(crate) fn grant(
    actor: &Actor,
    source: GrantSource,
    target: GrantTarget,
    level: AccessLevel,
) -> Grant {
    Grant {
        user_id: actor.user_id(),
        target,
        level,
        source,
    }
}
