//! Attendance records filtered by scope through their employee.

use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use frequencia_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{Employee, EmployeeId, Sector, SectorId, TimesheetId, WorkScheduleId};

/// Link a record uses to reach the organization tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeAnchor {
    /// Record is a sector or hangs directly from one.
    Sector(SectorId),
    /// Record belongs to an employee.
    Employee(EmployeeId),
}

/// Records that can be filtered by a scope predicate.
pub trait ScopedRecord {
    /// Returns the organizational anchor of this record.
    fn scope_anchor(&self) -> ScopeAnchor;
}

impl ScopedRecord for Sector {
    fn scope_anchor(&self) -> ScopeAnchor {
        ScopeAnchor::Sector(self.id())
    }
}

impl ScopedRecord for Employee {
    fn scope_anchor(&self) -> ScopeAnchor {
        ScopeAnchor::Sector(self.sector_id())
    }
}

/// Generated monthly attendance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timesheet {
    id: TimesheetId,
    employee_id: EmployeeId,
    month: u32,
    year: i32,
    generated_at: DateTime<Utc>,
}

impl Timesheet {
    /// Creates a validated timesheet.
    pub fn new(
        id: TimesheetId,
        employee_id: EmployeeId,
        month: u32,
        year: i32,
        generated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "timesheet month must be between 1 and 12, got {month}"
            )));
        }

        Ok(Self {
            id,
            employee_id,
            month,
            year,
            generated_at,
        })
    }

    /// Returns the timesheet identifier.
    #[must_use]
    pub fn id(&self) -> TimesheetId {
        self.id
    }

    /// Returns the employee the sheet belongs to.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the reference month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the reference year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns when the sheet was generated.
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

impl ScopedRecord for Timesheet {
    fn scope_anchor(&self) -> ScopeAnchor {
        ScopeAnchor::Employee(self.employee_id)
    }
}

/// Work shift of a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    /// Morning shift.
    Morning,
    /// Afternoon shift.
    Afternoon,
}

impl Shift {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
        }
    }
}

impl FromStr for Shift {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            _ => Err(AppError::Validation(format!("unknown shift '{value}'"))),
        }
    }
}

/// Working hours of an employee for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSchedule {
    id: WorkScheduleId,
    employee_id: EmployeeId,
    shift: Shift,
    starts_at: Option<NaiveTime>,
    ends_at: Option<NaiveTime>,
}

impl WorkSchedule {
    /// Creates a schedule entry; an end time must follow the start time.
    pub fn new(
        id: WorkScheduleId,
        employee_id: EmployeeId,
        shift: Shift,
        starts_at: Option<NaiveTime>,
        ends_at: Option<NaiveTime>,
    ) -> AppResult<Self> {
        if let (Some(start), Some(end)) = (starts_at, ends_at) {
            if end <= start {
                return Err(AppError::Validation(format!(
                    "schedule end {end} must be after start {start}"
                )));
            }
        }

        Ok(Self {
            id,
            employee_id,
            shift,
            starts_at,
            ends_at,
        })
    }

    /// Returns the schedule identifier.
    #[must_use]
    pub fn id(&self) -> WorkScheduleId {
        self.id
    }

    /// Returns the employee.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the shift.
    #[must_use]
    pub fn shift(&self) -> Shift {
        self.shift
    }

    /// Returns the start time.
    #[must_use]
    pub fn starts_at(&self) -> Option<NaiveTime> {
        self.starts_at
    }

    /// Returns the end time.
    #[must_use]
    pub fn ends_at(&self) -> Option<NaiveTime> {
        self.ends_at
    }
}

impl ScopedRecord for WorkSchedule {
    fn scope_anchor(&self) -> ScopeAnchor {
        ScopeAnchor::Employee(self.employee_id)
    }
}
