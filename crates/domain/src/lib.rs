//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod feature;
mod grant;
mod hierarchy;
mod ids;
mod organization;
mod records;
mod role_permission;
mod scope;

pub use access::AccessLevel;
pub use feature::{AccessTarget, Feature, FeatureRule};
pub use grant::{Grant, GrantSource, GrantTarget, TargetKind, UnifiedGrant};
pub use hierarchy::{CHAIN_RESOLUTION_ORDER, ChainStep, ResolvedChain};
pub use ids::{
    AgencyId, DepartmentId, EmployeeId, GrantId, MunicipalityId, RolePermissionId, SectorId,
    TimesheetId, WorkScheduleId,
};
pub use organization::{
    Agency, Department, Employee, Municipality, OrganizationTree, Sector, SectorParent,
    normalize_job_title,
};
pub use records::{ScopeAnchor, ScopedRecord, Shift, Timesheet, WorkSchedule};
pub use role_permission::{
    PRIVILEGED_JOB_TITLES, RolePermission, RoleScopeRestriction, is_privileged_job_title,
};
pub use scope::{EntityIdSets, ResolvedScope, ScopeFilter, ScopePath, ScopePredicate, ScopeSets};
