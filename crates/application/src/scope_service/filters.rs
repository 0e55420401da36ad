use super::*;

use frequencia_domain::{Employee, EmployeeId, ScopeFilter, Sector, Timesheet, WorkSchedule};

impl ScopeService {
    /// Builds the readable record filter of an actor.
    pub async fn sector_filter(&self, actor: &Actor) -> AppResult<ScopeFilter> {
        Ok(self.resolve_scope(actor).await?.filter())
    }

    /// Lists the sectors visible to an actor.
    pub async fn filter_sectors(&self, actor: &Actor) -> AppResult<Vec<Sector>> {
        let filter = self.sector_filter(actor).await?;
        self.organization.list_sectors(&filter).await
    }

    /// Lists the employees visible to an actor.
    pub async fn filter_employees(&self, actor: &Actor) -> AppResult<Vec<Employee>> {
        let filter = self.sector_filter(actor).await?;
        self.organization.list_employees(&filter).await
    }

    /// Lists the timesheets visible to an actor.
    pub async fn filter_timesheets(&self, actor: &Actor) -> AppResult<Vec<Timesheet>> {
        let filter = self.sector_filter(actor).await?;
        self.organization.list_timesheets(&filter).await
    }

    /// Lists the work schedules visible to an actor.
    pub async fn filter_work_schedules(&self, actor: &Actor) -> AppResult<Vec<WorkSchedule>> {
        let filter = self.sector_filter(actor).await?;
        self.organization.list_work_schedules(&filter).await
    }

    /// Returns whether an actor may read an employee. Unknown employees are denied.
    pub async fn can_access_employee(
        &self,
        actor: &Actor,
        employee_id: EmployeeId,
    ) -> AppResult<bool> {
        if actor.is_admin() {
            return Ok(true);
        }

        let Some(employee) = self.organization.find_employee(employee_id).await? else {
            return Ok(false);
        };

        let tree = self.organization.load_hierarchy().await?;
        let filter = self
            .resolve_with_tree(actor, AccessLevel::Read, &tree)
            .await?
            .filter();

        Ok(filter.allows_employee(&tree, &employee))
    }
}
