use async_trait::async_trait;
use frequencia_application::OrganizationRepository;
use frequencia_core::{AppResult, UserId};
use frequencia_domain::{
    Employee, EmployeeId, OrganizationTree, ScopeFilter, Sector, Timesheet, WorkSchedule,
};
use tokio::sync::RwLock;

/// In-memory organization repository for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationRepository {
    tree: RwLock<OrganizationTree>,
    timesheets: RwLock<Vec<Timesheet>>,
    work_schedules: RwLock<Vec<WorkSchedule>>,
}

impl InMemoryOrganizationRepository {
    /// Creates a repository seeded with an organization snapshot.
    #[must_use]
    pub fn new(tree: OrganizationTree) -> Self {
        Self {
            tree: RwLock::new(tree),
            timesheets: RwLock::new(Vec::new()),
            work_schedules: RwLock::new(Vec::new()),
        }
    }

    /// Replaces the organization snapshot.
    pub async fn replace_tree(&self, tree: OrganizationTree) {
        *self.tree.write().await = tree;
    }

    /// Adds or replaces an employee.
    pub async fn save_employee(&self, employee: Employee) -> AppResult<()> {
        self.tree.write().await.insert_employee(employee)
    }

    /// Appends a stored timesheet.
    pub async fn save_timesheet(&self, timesheet: Timesheet) {
        self.timesheets.write().await.push(timesheet);
    }

    /// Appends a schedule entry.
    pub async fn save_work_schedule(&self, work_schedule: WorkSchedule) {
        self.work_schedules.write().await.push(work_schedule);
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn load_hierarchy(&self) -> AppResult<OrganizationTree> {
        Ok(self.tree.read().await.clone())
    }

    async fn find_employee(&self, employee_id: EmployeeId) -> AppResult<Option<Employee>> {
        Ok(self.tree.read().await.employee(employee_id).cloned())
    }

    async fn find_employee_for_user(&self, user_id: UserId) -> AppResult<Option<Employee>> {
        Ok(self.tree.read().await.employee_for_user(user_id).cloned())
    }

    async fn list_sectors(&self, filter: &ScopeFilter) -> AppResult<Vec<Sector>> {
        let tree = self.tree.read().await;
        let mut sectors: Vec<Sector> = tree.sectors().cloned().collect();
        sectors.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        Ok(filter.apply(&tree, sectors))
    }

    async fn list_employees(&self, filter: &ScopeFilter) -> AppResult<Vec<Employee>> {
        let tree = self.tree.read().await;
        let mut employees: Vec<Employee> = tree.employees().cloned().collect();
        employees.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        Ok(filter.apply(&tree, employees))
    }

    async fn list_timesheets(&self, filter: &ScopeFilter) -> AppResult<Vec<Timesheet>> {
        let tree = self.tree.read().await;
        let timesheets = self.timesheets.read().await.clone();

        Ok(filter.apply(&tree, timesheets))
    }

    async fn list_work_schedules(&self, filter: &ScopeFilter) -> AppResult<Vec<WorkSchedule>> {
        let tree = self.tree.read().await;
        let work_schedules = self.work_schedules.read().await.clone();

        Ok(filter.apply(&tree, work_schedules))
    }
}
