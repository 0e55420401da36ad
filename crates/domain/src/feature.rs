use std::str::FromStr;

use frequencia_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{AccessLevel, AgencyId, DepartmentId, EmployeeId, MunicipalityId, SectorId};

/// Static authorization rule attached to a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRule {
    /// Minimum level the actor needs.
    pub required_level: AccessLevel,
    /// Only super administrators may use the feature.
    pub superuser_only: bool,
}

impl FeatureRule {
    const fn read() -> Self {
        Self {
            required_level: AccessLevel::Read,
            superuser_only: false,
        }
    }

    const fn manage() -> Self {
        Self {
            required_level: AccessLevel::Manage,
            superuser_only: false,
        }
    }

    const fn superuser() -> Self {
        Self {
            required_level: AccessLevel::Manage,
            superuser_only: true,
        }
    }
}

macro_rules! features {
    ($($(#[$meta:meta])* $variant:ident => $name:literal, $rule:ident;)+) => {
        /// Closed catalog of gated application actions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Feature {
            $($(#[$meta])* $variant,)+
        }

        impl Feature {
            /// Returns every feature in catalog order.
            #[must_use]
            pub fn all() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }

            /// Returns the stable transport name.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Returns the rule bound to this feature.
            #[must_use]
            pub const fn rule(&self) -> FeatureRule {
                match self {
                    $(Self::$variant => FeatureRule::$rule(),)+
                }
            }
        }

        impl FromStr for Feature {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(AppError::Validation(format!("unknown feature '{value}'"))),
                }
            }
        }
    };
}

features! {
    /// Control panel.
    ViewDashboard => "view_dashboard", read;
    /// Employee listing.
    ViewEmployees => "view_employees", read;
    /// Employee creation.
    CreateEmployee => "create_employee", manage;
    /// Employee edition.
    EditEmployee => "edit_employee", manage;
    /// Employee removal.
    DeleteEmployee => "delete_employee", manage;
    /// Work schedule creation.
    CreateSchedule => "create_schedule", manage;
    /// Work schedule edition.
    EditSchedule => "edit_schedule", manage;
    /// Holiday listing.
    ViewHolidays => "view_holidays", read;
    /// Holiday creation.
    CreateHoliday => "create_holiday", manage;
    /// Holiday edition.
    EditHoliday => "edit_holiday", manage;
    /// Holiday removal.
    DeleteHoliday => "delete_holiday", manage;
    /// Timesheet listing.
    ViewTimesheets => "view_timesheets", read;
    /// Single timesheet view.
    ViewTimesheet => "view_timesheet", read;
    /// Monthly payroll sheet generation.
    GeneratePayrollSheet => "generate_payroll_sheet", manage;
    /// Sector-wide payroll sheet generation.
    GeneratePayrollBatch => "generate_payroll_batch", manage;
    /// Payroll sheet generation across several months.
    GeneratePayrollMultiMonth => "generate_payroll_multi_month", manage;
    /// Timesheet removal.
    DeleteTimesheet => "delete_timesheet", manage;
    /// Logbook cover printing.
    LogbookCover => "logbook_cover", read;
    /// Employee record sheet.
    ViewEmployeeRecord => "view_employee_record", read;
    /// Custom report.
    CustomReport => "custom_report", read;
    /// Report of professors with planning hours.
    ProfessorReport => "professor_report", read;
    /// General reports.
    Reports => "reports", read;
    /// Employee spreadsheet import.
    ImportEmployees => "import_employees", manage;
    /// Schedule spreadsheet import.
    ImportSchedules => "import_schedules", manage;
    /// Grant creation.
    GrantAccess => "grant_access", superuser;
    /// Grant removal.
    RevokeAccess => "revoke_access", superuser;
    /// Grant and role permission administration.
    ManageScopes => "manage_scopes", superuser;
    /// Scope inspection.
    DebugScopes => "debug_scopes", superuser;
}

impl Feature {
    /// Parses a transport value into a feature.
    pub fn parse_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

/// Entity a feature check is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum AccessTarget {
    /// A specific employee.
    Employee(EmployeeId),
    /// A sector.
    Sector(SectorId),
    /// A department.
    Department(DepartmentId),
    /// An agency.
    Agency(AgencyId),
    /// A municipality.
    Municipality(MunicipalityId),
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Feature;
    use crate::AccessLevel;

    #[test]
    fn catalog_names_round_trip_and_accept_upper_case() {
        for feature in Feature::all() {
            assert_eq!(Feature::from_str(feature.as_str()).ok(), Some(*feature));
        }
        assert_eq!(
            Feature::from_str("CREATE_EMPLOYEE").ok(),
            Some(Feature::CreateEmployee)
        );
        assert!(Feature::from_str("launch_rockets").is_err());
    }

    #[test]
    fn access_administration_is_superuser_only() {
        let superuser_only: Vec<Feature> = Feature::all()
            .iter()
            .copied()
            .filter(|feature| feature.rule().superuser_only)
            .collect();

        assert_eq!(
            superuser_only,
            vec![
                Feature::GrantAccess,
                Feature::RevokeAccess,
                Feature::ManageScopes,
                Feature::DebugScopes
            ]
        );
        assert_eq!(
            Feature::GeneratePayrollBatch.rule().required_level,
            AccessLevel::Manage
        );
        assert_eq!(Feature::ViewTimesheets.rule().required_level, AccessLevel::Read);
    }
}
