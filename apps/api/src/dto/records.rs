use frequencia_domain::{Employee, Sector, Timesheet, WorkSchedule};
use serde::Serialize;

/// API representation of a sector.
#[derive(Debug, Serialize)]
pub struct SectorResponse {
    pub sector_id: String,
    pub name: String,
    pub municipality_id: Option<String>,
    pub department_id: Option<String>,
    pub agency_id: Option<String>,
    pub head_employee_id: Option<String>,
}

impl From<Sector> for SectorResponse {
    fn from(sector: Sector) -> Self {
        Self {
            sector_id: sector.id().to_string(),
            name: sector.name().as_str().to_owned(),
            municipality_id: sector.municipality_id().map(|id| id.to_string()),
            department_id: sector
                .department_id()
                .or(sector.legacy_department_id())
                .map(|id| id.to_string()),
            agency_id: sector.agency_id().map(|id| id.to_string()),
            head_employee_id: sector.head_employee_id().map(|id| id.to_string()),
        }
    }
}

/// API representation of an employee.
#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub employee_id: String,
    pub sector_id: String,
    pub name: String,
    pub registration: String,
    pub job_title: String,
    pub is_sector_head: bool,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            employee_id: employee.id().to_string(),
            sector_id: employee.sector_id().to_string(),
            name: employee.name().as_str().to_owned(),
            registration: employee.registration().as_str().to_owned(),
            job_title: employee.job_title().to_owned(),
            is_sector_head: employee.is_sector_head(),
        }
    }
}

/// API representation of a stored timesheet.
#[derive(Debug, Serialize)]
pub struct TimesheetResponse {
    pub timesheet_id: String,
    pub employee_id: String,
    pub month: u32,
    pub year: i32,
    pub generated_at: String,
}

impl From<Timesheet> for TimesheetResponse {
    fn from(timesheet: Timesheet) -> Self {
        Self {
            timesheet_id: timesheet.id().to_string(),
            employee_id: timesheet.employee_id().to_string(),
            month: timesheet.month(),
            year: timesheet.year(),
            generated_at: timesheet.generated_at().to_rfc3339(),
        }
    }
}

/// API representation of a work schedule entry.
#[derive(Debug, Serialize)]
pub struct WorkScheduleResponse {
    pub work_schedule_id: String,
    pub employee_id: String,
    pub shift: &'static str,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

impl From<WorkSchedule> for WorkScheduleResponse {
    fn from(schedule: WorkSchedule) -> Self {
        Self {
            work_schedule_id: schedule.id().to_string(),
            employee_id: schedule.employee_id().to_string(),
            shift: schedule.shift().as_str(),
            starts_at: schedule.starts_at().map(|time| time.format("%H:%M").to_string()),
            ends_at: schedule.ends_at().map(|time| time.format("%H:%M").to_string()),
        }
    }
}
