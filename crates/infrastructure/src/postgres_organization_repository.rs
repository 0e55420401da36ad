use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use frequencia_application::OrganizationRepository;
use frequencia_core::{AppError, AppResult, UserId};
use frequencia_domain::{
    Agency, AgencyId, Department, DepartmentId, Employee, EmployeeId, Municipality,
    MunicipalityId, OrganizationTree, ScopeFilter, Sector, SectorId, Shift, Timesheet,
    TimesheetId, WorkSchedule, WorkScheduleId,
};

mod scope_sql;

use scope_sql::{SECTOR_SCOPE_JOINS, push_scope_condition};

/// PostgreSQL-backed organization reads and scoped listings.
#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MunicipalityRow {
    id: Uuid,
    name: String,
    tax_id: Option<String>,
    city: Option<String>,
    state_code: Option<String>,
}

#[derive(Debug, FromRow)]
struct DepartmentRow {
    id: Uuid,
    name: String,
    municipality_id: Option<Uuid>,
    agency_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct AgencyRow {
    id: Uuid,
    name: String,
    department_id: Option<Uuid>,
    municipality_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct SectorRow {
    id: Uuid,
    name: String,
    municipality_id: Option<Uuid>,
    department_id: Option<Uuid>,
    agency_id: Option<Uuid>,
    legacy_department_id: Option<Uuid>,
    head_employee_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: Uuid,
    sector_id: Uuid,
    name: String,
    registration: String,
    job_title: String,
    user_id: Option<Uuid>,
    is_sector_head: bool,
}

#[derive(Debug, FromRow)]
struct TimesheetRow {
    id: Uuid,
    employee_id: Uuid,
    month: i16,
    year: i32,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct WorkScheduleRow {
    id: Uuid,
    employee_id: Uuid,
    shift: String,
    starts_at: Option<NaiveTime>,
    ends_at: Option<NaiveTime>,
}

const SECTOR_COLUMNS: &str = r#"
    scope_sector.id,
    scope_sector.name,
    scope_sector.municipality_id,
    scope_sector.department_id,
    scope_sector.agency_id,
    scope_sector.legacy_department_id,
    scope_sector.head_employee_id
"#;

const EMPLOYEE_COLUMNS: &str = r#"
    employee.id,
    employee.sector_id,
    employee.name,
    employee.registration,
    employee.job_title,
    employee.user_id,
    employee.is_sector_head
"#;

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn load_hierarchy(&self) -> AppResult<OrganizationTree> {
        let municipalities = sqlx::query_as::<_, MunicipalityRow>(
            r#"
            SELECT id, name, tax_id, city, state_code
            FROM municipalities
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load municipalities: {error}")))?;

        let departments = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT id, name, municipality_id, agency_id
            FROM departments
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load departments: {error}")))?;

        let agencies = sqlx::query_as::<_, AgencyRow>(
            r#"
            SELECT id, name, department_id, municipality_id
            FROM agencies
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load agencies: {error}")))?;

        let sectors = sqlx::query_as::<_, SectorRow>(&format!(
            "SELECT {SECTOR_COLUMNS} FROM sectors AS scope_sector"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load sectors: {error}")))?;

        let mut tree = OrganizationTree::new();
        for municipality in decode_snapshot_rows(municipalities, municipality_from_row) {
            tree.insert_municipality(municipality);
        }
        for department in decode_snapshot_rows(departments, department_from_row) {
            tree.insert_department(department);
        }
        for agency in decode_snapshot_rows(agencies, agency_from_row) {
            tree.insert_agency(agency);
        }
        for sector in decode_snapshot_rows(sectors, sector_from_row) {
            tree.insert_sector(sector);
        }

        Ok(tree)
    }

    async fn find_employee(&self, employee_id: EmployeeId) -> AppResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees AS employee WHERE employee.id = $1"
        ))
        .bind(employee_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find employee '{employee_id}': {error}"))
        })?;

        row.map(employee_from_row).transpose()
    }

    async fn find_employee_for_user(&self, user_id: UserId) -> AppResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees AS employee WHERE employee.user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find employee linked to user '{user_id}': {error}"
            ))
        })?;

        row.map(employee_from_row).transpose()
    }

    async fn list_sectors(&self, filter: &ScopeFilter) -> AppResult<Vec<Sector>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        builder.push(SECTOR_COLUMNS);
        builder.push(" FROM sectors AS scope_sector");
        builder.push(SECTOR_SCOPE_JOINS);
        builder.push(" WHERE ");
        push_scope_condition(&mut builder, filter);
        builder.push(" ORDER BY scope_sector.name, scope_sector.id");

        let rows = builder
            .build_query_as::<SectorRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list sectors: {error}")))?;

        rows.into_iter().map(sector_from_row).collect()
    }

    async fn list_employees(&self, filter: &ScopeFilter) -> AppResult<Vec<Employee>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        builder.push(EMPLOYEE_COLUMNS);
        builder.push(
            " FROM employees AS employee INNER JOIN sectors AS scope_sector ON scope_sector.id = employee.sector_id",
        );
        builder.push(SECTOR_SCOPE_JOINS);
        builder.push(" WHERE ");
        push_scope_condition(&mut builder, filter);
        builder.push(" ORDER BY employee.name, employee.id");

        let rows = builder
            .build_query_as::<EmployeeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list employees: {error}")))?;

        rows.into_iter().map(employee_from_row).collect()
    }

    async fn list_timesheets(&self, filter: &ScopeFilter) -> AppResult<Vec<Timesheet>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"
            SELECT
                timesheet.id,
                timesheet.employee_id,
                timesheet.month,
                timesheet.year,
                timesheet.generated_at
            FROM timesheets AS timesheet
            INNER JOIN employees AS employee ON employee.id = timesheet.employee_id
            INNER JOIN sectors AS scope_sector ON scope_sector.id = employee.sector_id
            "#,
        );
        builder.push(SECTOR_SCOPE_JOINS);
        builder.push(" WHERE ");
        push_scope_condition(&mut builder, filter);
        builder.push(" ORDER BY timesheet.year DESC, timesheet.month DESC, timesheet.id");

        let rows = builder
            .build_query_as::<TimesheetRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list timesheets: {error}")))?;

        rows.into_iter().map(timesheet_from_row).collect()
    }

    async fn list_work_schedules(&self, filter: &ScopeFilter) -> AppResult<Vec<WorkSchedule>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"
            SELECT
                schedule.id,
                schedule.employee_id,
                schedule.shift,
                schedule.starts_at,
                schedule.ends_at
            FROM work_schedules AS schedule
            INNER JOIN employees AS employee ON employee.id = schedule.employee_id
            INNER JOIN sectors AS scope_sector ON scope_sector.id = employee.sector_id
            "#,
        );
        builder.push(SECTOR_SCOPE_JOINS);
        builder.push(" WHERE ");
        push_scope_condition(&mut builder, filter);
        builder.push(" ORDER BY employee.name, schedule.shift, schedule.id");

        let rows = builder
            .build_query_as::<WorkScheduleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list work schedules: {error}"))
            })?;

        rows.into_iter().map(work_schedule_from_row).collect()
    }
}

fn decode_error(entity: &str, id: Uuid, error: AppError) -> AppError {
    AppError::Internal(format!("failed to decode {entity} '{id}': {error}"))
}

/// Rows that fail validation are logged and left out of the snapshot.
fn decode_snapshot_rows<R, T>(rows: Vec<R>, decode: impl Fn(R) -> AppResult<T>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match decode(row) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%error, "skipping undecodable hierarchy row");
                None
            }
        })
        .collect()
}

fn municipality_from_row(row: MunicipalityRow) -> AppResult<Municipality> {
    let id = row.id;
    Municipality::new(MunicipalityId::from_uuid(id), row.name, row.tax_id)
        .map(|municipality| municipality.with_location(row.city, row.state_code))
        .map_err(|error| decode_error("municipality", id, error))
}

fn department_from_row(row: DepartmentRow) -> AppResult<Department> {
    Department::from_stored(
        DepartmentId::from_uuid(row.id),
        row.name,
        row.municipality_id.map(MunicipalityId::from_uuid),
    )
    .map(|department| department.with_agency(row.agency_id.map(AgencyId::from_uuid)))
    .map_err(|error| decode_error("department", row.id, error))
}

fn agency_from_row(row: AgencyRow) -> AppResult<Agency> {
    Agency::from_stored(
        AgencyId::from_uuid(row.id),
        row.name,
        row.department_id.map(DepartmentId::from_uuid),
        row.municipality_id.map(MunicipalityId::from_uuid),
    )
    .map_err(|error| decode_error("agency", row.id, error))
}

fn sector_from_row(row: SectorRow) -> AppResult<Sector> {
    Sector::from_stored(
        SectorId::from_uuid(row.id),
        row.name,
        row.municipality_id.map(MunicipalityId::from_uuid),
        row.department_id.map(DepartmentId::from_uuid),
        row.agency_id.map(AgencyId::from_uuid),
    )
    .map(|sector| {
        sector
            .with_legacy_department(row.legacy_department_id.map(DepartmentId::from_uuid))
            .with_head(row.head_employee_id.map(EmployeeId::from_uuid))
    })
    .map_err(|error| decode_error("sector", row.id, error))
}

fn employee_from_row(row: EmployeeRow) -> AppResult<Employee> {
    Employee::new(
        EmployeeId::from_uuid(row.id),
        SectorId::from_uuid(row.sector_id),
        row.name,
        row.registration,
        row.job_title,
    )
    .map(|employee| {
        employee
            .with_user(row.user_id.map(UserId::from_uuid))
            .with_sector_head_flag(row.is_sector_head)
    })
    .map_err(|error| decode_error("employee", row.id, error))
}

fn timesheet_from_row(row: TimesheetRow) -> AppResult<Timesheet> {
    let month = u32::try_from(row.month).map_err(|error| {
        AppError::Internal(format!(
            "failed to decode timesheet '{}' month {}: {error}",
            row.id, row.month
        ))
    })?;

    Timesheet::new(
        TimesheetId::from_uuid(row.id),
        EmployeeId::from_uuid(row.employee_id),
        month,
        row.year,
        row.generated_at,
    )
    .map_err(|error| decode_error("timesheet", row.id, error))
}

fn work_schedule_from_row(row: WorkScheduleRow) -> AppResult<WorkSchedule> {
    let shift =
        Shift::from_str(row.shift.as_str()).map_err(|error| decode_error("work schedule", row.id, error))?;

    WorkSchedule::new(
        WorkScheduleId::from_uuid(row.id),
        EmployeeId::from_uuid(row.employee_id),
        shift,
        row.starts_at,
        row.ends_at,
    )
    .map_err(|error| decode_error("work schedule", row.id, error))
}
