use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use frequencia_domain::{EntityIdSets, ScopeFilter, ScopePath};

/// Joins resolving every parent of `scope_sector` that a scope path can reach.
///
/// All joins are many-to-one, so they never duplicate the scoped rows.
pub(super) const SECTOR_SCOPE_JOINS: &str = r#"
    LEFT JOIN agencies AS scope_agency
        ON scope_agency.id = scope_sector.agency_id
    LEFT JOIN departments AS scope_department
        ON scope_department.id = scope_sector.department_id
    LEFT JOIN departments AS scope_legacy_department
        ON scope_legacy_department.id = scope_sector.legacy_department_id
    LEFT JOIN departments AS scope_agency_department
        ON scope_agency_department.id = scope_agency.department_id
    LEFT JOIN agencies AS scope_department_agency
        ON scope_department_agency.id = scope_department.agency_id
    LEFT JOIN departments AS scope_department_agency_department
        ON scope_department_agency_department.id = scope_department_agency.department_id
"#;

/// Pushes the filter as a boolean SQL condition over the scope aliases.
pub(super) fn push_scope_condition(builder: &mut QueryBuilder<'_, Postgres>, filter: &ScopeFilter) {
    let predicate = match filter {
        ScopeFilter::All => {
            builder.push("TRUE");
            return;
        }
        ScopeFilter::Matching(predicate) => predicate,
    };

    if predicate.is_empty() {
        builder.push("FALSE");
        return;
    }

    builder.push("(");
    for (index, path) in predicate.paths().iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }
        builder.push(path_column(*path));
        builder.push(" = ANY(");
        builder.push_bind(path_ids(*path, predicate.sets()));
        builder.push(")");
    }
    builder.push(")");
}

fn path_column(path: ScopePath) -> &'static str {
    match path {
        ScopePath::Sector => "scope_sector.id",
        ScopePath::SectorAgency => "scope_sector.agency_id",
        ScopePath::SectorDepartment => "scope_sector.department_id",
        ScopePath::SectorLegacyDepartment => "scope_sector.legacy_department_id",
        ScopePath::SectorAgencyDepartment => "scope_agency.department_id",
        ScopePath::SectorMunicipality => "scope_sector.municipality_id",
        ScopePath::SectorDepartmentMunicipality => "scope_department.municipality_id",
        ScopePath::SectorLegacyDepartmentMunicipality => "scope_legacy_department.municipality_id",
        ScopePath::SectorAgencyDepartmentMunicipality => "scope_agency_department.municipality_id",
        ScopePath::SectorAgencyMunicipality => "scope_agency.municipality_id",
        ScopePath::SectorDepartmentAgency => "scope_department.agency_id",
        ScopePath::SectorDepartmentAgencyMunicipality => "scope_department_agency.municipality_id",
        ScopePath::SectorDepartmentAgencyDepartmentMunicipality => {
            "scope_department_agency_department.municipality_id"
        }
    }
}

fn path_ids(path: ScopePath, sets: &EntityIdSets) -> Vec<Uuid> {
    match path {
        ScopePath::Sector => sets.sectors.iter().map(|id| id.as_uuid()).collect(),
        ScopePath::SectorAgency | ScopePath::SectorDepartmentAgency => {
            sets.agencies.iter().map(|id| id.as_uuid()).collect()
        }
        ScopePath::SectorDepartment
        | ScopePath::SectorLegacyDepartment
        | ScopePath::SectorAgencyDepartment => {
            sets.departments.iter().map(|id| id.as_uuid()).collect()
        }
        ScopePath::SectorMunicipality
        | ScopePath::SectorDepartmentMunicipality
        | ScopePath::SectorLegacyDepartmentMunicipality
        | ScopePath::SectorAgencyDepartmentMunicipality
        | ScopePath::SectorAgencyMunicipality
        | ScopePath::SectorDepartmentAgencyMunicipality
        | ScopePath::SectorDepartmentAgencyDepartmentMunicipality => {
            sets.municipalities.iter().map(|id| id.as_uuid()).collect()
        }
    }
}
