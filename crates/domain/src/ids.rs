use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a municipality.
    MunicipalityId
);
entity_id!(
    /// Identifier of a department (secretariat).
    DepartmentId
);
entity_id!(
    /// Identifier of an agency.
    AgencyId
);
entity_id!(
    /// Identifier of a sector.
    SectorId
);
entity_id!(
    /// Identifier of an employee.
    EmployeeId
);
entity_id!(
    /// Identifier of a unified grant row.
    GrantId
);
entity_id!(
    /// Identifier of a job-title role permission row.
    RolePermissionId
);
entity_id!(
    /// Identifier of a stored monthly timesheet.
    TimesheetId
);
entity_id!(
    /// Identifier of a work schedule entry.
    WorkScheduleId
);
