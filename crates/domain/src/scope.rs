//! Resolved scopes and the predicates derived from them.
//!
//! A scope keeps two id sets: what was granted and the ancestors of each
//! grant. At `Read` the ancestors count as readable scope, so a sector grant
//! opens its whole chain. At `Manage` filters and point checks read the granted
//! set alone. The subtree below each id is reached through [`ScopePath`]
//! matching, never by materializing descendants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    AccessLevel, AgencyId, DepartmentId, Employee, GrantTarget, MunicipalityId, OrganizationTree,
    ResolvedChain, ScopeAnchor, ScopedRecord, Sector, SectorId, TargetKind,
};

/// One id set per hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdSets {
    /// Municipality ids.
    pub municipalities: BTreeSet<MunicipalityId>,
    /// Department ids.
    pub departments: BTreeSet<DepartmentId>,
    /// Agency ids.
    pub agencies: BTreeSet<AgencyId>,
    /// Sector ids.
    pub sectors: BTreeSet<SectorId>,
}

impl EntityIdSets {
    /// Adds a grant target to the matching set.
    pub fn insert_target(&mut self, target: GrantTarget) {
        match target {
            GrantTarget::Municipality(id) => {
                self.municipalities.insert(id);
            }
            GrantTarget::Department(id) => {
                self.departments.insert(id);
            }
            GrantTarget::Agency(id) => {
                self.agencies.insert(id);
            }
            GrantTarget::Sector(id) => {
                self.sectors.insert(id);
            }
        }
    }

    /// Adds every populated link of a resolved chain.
    pub fn insert_chain(&mut self, chain: &ResolvedChain) {
        if let Some(id) = chain.agency_id {
            self.agencies.insert(id);
        }
        if let Some(id) = chain.department_id {
            self.departments.insert(id);
        }
        if let Some(id) = chain.municipality_id {
            self.municipalities.insert(id);
        }
    }

    /// Adds every id of `other`.
    pub fn merge(&mut self, other: &Self) {
        self.municipalities.extend(other.municipalities.iter().copied());
        self.departments.extend(other.departments.iter().copied());
        self.agencies.extend(other.agencies.iter().copied());
        self.sectors.extend(other.sectors.iter().copied());
    }

    /// Returns whether the target id is present in its set.
    #[must_use]
    pub fn contains(&self, target: GrantTarget) -> bool {
        match target {
            GrantTarget::Municipality(id) => self.municipalities.contains(&id),
            GrantTarget::Department(id) => self.departments.contains(&id),
            GrantTarget::Agency(id) => self.agencies.contains(&id),
            GrantTarget::Sector(id) => self.sectors.contains(&id),
        }
    }

    /// Returns whether the set for a level holds anything.
    #[must_use]
    pub fn has_kind(&self, kind: TargetKind) -> bool {
        match kind {
            TargetKind::Municipality => !self.municipalities.is_empty(),
            TargetKind::Department => !self.departments.is_empty(),
            TargetKind::Agency => !self.agencies.is_empty(),
            TargetKind::Sector => !self.sectors.is_empty(),
        }
    }

    /// Returns whether every set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
            && self.departments.is_empty()
            && self.agencies.is_empty()
            && self.sectors.is_empty()
    }

    /// Returns the total number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.municipalities.len() + self.departments.len() + self.agencies.len() + self.sectors.len()
    }
}

/// Ids reachable by a restricted user at one access level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSets {
    level: AccessLevel,
    granted: EntityIdSets,
    ancestors: EntityIdSets,
}

impl ScopeSets {
    /// Creates an empty scope resolved at `level`.
    #[must_use]
    pub fn new(level: AccessLevel) -> Self {
        Self {
            level,
            granted: EntityIdSets::default(),
            ancestors: EntityIdSets::default(),
        }
    }

    /// Returns the level the scope was resolved at.
    #[must_use]
    pub fn level(&self) -> AccessLevel {
        self.level
    }

    /// Records a granted entity.
    pub fn grant(&mut self, target: GrantTarget) {
        self.granted.insert_target(target);
    }

    /// Records the ancestors of a granted entity.
    pub fn expose_ancestors(&mut self, chain: &ResolvedChain) {
        self.ancestors.insert_chain(chain);
    }

    /// Returns the granted ids.
    #[must_use]
    pub fn granted(&self) -> &EntityIdSets {
        &self.granted
    }

    /// Returns the ancestor ids.
    #[must_use]
    pub fn ancestors(&self) -> &EntityIdSets {
        &self.ancestors
    }

    /// Returns granted and ancestor ids together.
    #[must_use]
    pub fn visible(&self) -> EntityIdSets {
        let mut visible = self.granted.clone();
        visible.merge(&self.ancestors);
        visible
    }

    /// Returns the ids record filters test against.
    #[must_use]
    pub fn effective(&self) -> EntityIdSets {
        match self.level {
            AccessLevel::Read => self.visible(),
            AccessLevel::Manage => self.granted.clone(),
        }
    }

    /// Returns whether nothing was granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

/// Outcome of scope resolution for one user and level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedScope {
    /// Administrators see everything.
    Unrestricted,
    /// Everyone else sees what was granted.
    Restricted(ScopeSets),
}

impl ResolvedScope {
    /// Returns whether this scope bypasses filtering.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns whether this scope grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unrestricted => false,
            Self::Restricted(sets) => sets.is_empty(),
        }
    }

    /// Returns the restricted sets, if any.
    #[must_use]
    pub fn sets(&self) -> Option<&ScopeSets> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted(sets) => Some(sets),
        }
    }

    /// Builds the record filter for this scope.
    #[must_use]
    pub fn filter(&self) -> ScopeFilter {
        match self {
            Self::Unrestricted => ScopeFilter::All,
            Self::Restricted(sets) => {
                ScopeFilter::Matching(ScopePredicate::from_granted(sets.effective()))
            }
        }
    }
}

/// One legacy-or-current route from a sector to a granted id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopePath {
    /// `sector.id`
    Sector,
    /// `sector.agency`
    SectorAgency,
    /// `sector.department`
    SectorDepartment,
    /// `sector.legacy_department`
    SectorLegacyDepartment,
    /// `sector.agency.department`
    SectorAgencyDepartment,
    /// `sector.municipality`
    SectorMunicipality,
    /// `sector.department.municipality`
    SectorDepartmentMunicipality,
    /// `sector.legacy_department.municipality`
    SectorLegacyDepartmentMunicipality,
    /// `sector.agency.department.municipality`
    SectorAgencyDepartmentMunicipality,
    /// `sector.agency.municipality` on legacy agencies
    SectorAgencyMunicipality,
    /// `sector.department.agency` on inverted departments
    SectorDepartmentAgency,
    /// `sector.department.agency.municipality`
    SectorDepartmentAgencyMunicipality,
    /// `sector.department.agency.department.municipality`
    SectorDepartmentAgencyDepartmentMunicipality,
}

impl ScopePath {
    /// Every path, in evaluation order.
    pub const ALL: [Self; 13] = [
        Self::Sector,
        Self::SectorAgency,
        Self::SectorDepartment,
        Self::SectorLegacyDepartment,
        Self::SectorAgencyDepartment,
        Self::SectorMunicipality,
        Self::SectorDepartmentMunicipality,
        Self::SectorLegacyDepartmentMunicipality,
        Self::SectorAgencyDepartmentMunicipality,
        Self::SectorAgencyMunicipality,
        Self::SectorDepartmentAgency,
        Self::SectorDepartmentAgencyMunicipality,
        Self::SectorDepartmentAgencyDepartmentMunicipality,
    ];

    /// Returns which id set the path ends in.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Sector => TargetKind::Sector,
            Self::SectorAgency | Self::SectorDepartmentAgency => TargetKind::Agency,
            Self::SectorDepartment | Self::SectorLegacyDepartment | Self::SectorAgencyDepartment => {
                TargetKind::Department
            }
            Self::SectorMunicipality
            | Self::SectorDepartmentMunicipality
            | Self::SectorLegacyDepartmentMunicipality
            | Self::SectorAgencyDepartmentMunicipality
            | Self::SectorAgencyMunicipality
            | Self::SectorDepartmentAgencyMunicipality
            | Self::SectorDepartmentAgencyDepartmentMunicipality => TargetKind::Municipality,
        }
    }

    fn matches(&self, tree: &OrganizationTree, sector: &Sector, sets: &EntityIdSets) -> bool {
        let agency = || sector.agency_id().and_then(|id| tree.agency(id));
        let department_municipality = |id: Option<DepartmentId>| {
            id.and_then(|id| tree.department(id))
                .and_then(|department| department.municipality_id())
        };
        let department_agency = || {
            sector
                .department_id()
                .and_then(|id| tree.department(id))
                .and_then(|department| department.agency_id())
        };

        match self {
            Self::Sector => sets.sectors.contains(&sector.id()),
            Self::SectorAgency => contains(&sets.agencies, sector.agency_id()),
            Self::SectorDepartment => contains(&sets.departments, sector.department_id()),
            Self::SectorLegacyDepartment => {
                contains(&sets.departments, sector.legacy_department_id())
            }
            Self::SectorAgencyDepartment => contains(
                &sets.departments,
                agency().and_then(|agency| agency.department_id()),
            ),
            Self::SectorMunicipality => contains(&sets.municipalities, sector.municipality_id()),
            Self::SectorDepartmentMunicipality => contains(
                &sets.municipalities,
                department_municipality(sector.department_id()),
            ),
            Self::SectorLegacyDepartmentMunicipality => contains(
                &sets.municipalities,
                department_municipality(sector.legacy_department_id()),
            ),
            Self::SectorAgencyDepartmentMunicipality => contains(
                &sets.municipalities,
                department_municipality(agency().and_then(|agency| agency.department_id())),
            ),
            Self::SectorAgencyMunicipality => contains(
                &sets.municipalities,
                agency().and_then(|agency| agency.municipality_id()),
            ),
            Self::SectorDepartmentAgency => contains(&sets.agencies, department_agency()),
            Self::SectorDepartmentAgencyMunicipality => contains(
                &sets.municipalities,
                department_agency()
                    .and_then(|id| tree.agency(id))
                    .and_then(|agency| agency.municipality_id()),
            ),
            Self::SectorDepartmentAgencyDepartmentMunicipality => contains(
                &sets.municipalities,
                department_municipality(
                    department_agency()
                        .and_then(|id| tree.agency(id))
                        .and_then(|agency| agency.department_id()),
                ),
            ),
        }
    }
}

fn contains<T: Ord>(set: &BTreeSet<T>, value: Option<T>) -> bool {
    value.is_some_and(|value| set.contains(&value))
}

/// Disjunction of every path whose id set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePredicate {
    sets: EntityIdSets,
    paths: Vec<ScopePath>,
}

impl ScopePredicate {
    /// Builds the predicate for a set of granted ids.
    #[must_use]
    pub fn from_granted(sets: EntityIdSets) -> Self {
        let paths = ScopePath::ALL
            .into_iter()
            .filter(|path| sets.has_kind(path.kind()))
            .collect();

        Self { sets, paths }
    }

    /// Returns the ids the predicate tests against.
    #[must_use]
    pub fn sets(&self) -> &EntityIdSets {
        &self.sets
    }

    /// Returns the active paths.
    #[must_use]
    pub fn paths(&self) -> &[ScopePath] {
        self.paths.as_slice()
    }

    /// Returns whether the predicate can never match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns whether any path from the sector reaches a granted id.
    #[must_use]
    pub fn matches_sector(&self, tree: &OrganizationTree, sector: &Sector) -> bool {
        self.paths
            .iter()
            .any(|path| path.matches(tree, sector, &self.sets))
    }

    /// Returns whether a grant target lies inside the granted subtrees.
    ///
    /// Only the target itself and its ancestors are consulted, so a grant on a
    /// child never covers its parent.
    #[must_use]
    pub fn covers(&self, tree: &OrganizationTree, target: GrantTarget) -> bool {
        match target {
            GrantTarget::Municipality(id) => self.sets.municipalities.contains(&id),
            GrantTarget::Department(id) => {
                if self.sets.departments.contains(&id) {
                    return true;
                }
                let Some(department) = tree.department(id) else {
                    return false;
                };
                let chain = tree.resolve_department_chain(department);
                contains(&self.sets.agencies, chain.agency_id)
                    || contains(&self.sets.municipalities, chain.municipality_id)
            }
            GrantTarget::Agency(id) => {
                if self.sets.agencies.contains(&id) {
                    return true;
                }
                let Some(agency) = tree.agency(id) else {
                    return false;
                };
                let chain = tree.resolve_agency_chain(agency);
                contains(&self.sets.departments, chain.department_id)
                    || contains(&self.sets.municipalities, chain.municipality_id)
                    || contains(&self.sets.municipalities, agency.municipality_id())
            }
            GrantTarget::Sector(id) => tree
                .sector(id)
                .is_some_and(|sector| self.matches_sector(tree, sector)),
        }
    }
}

/// Record filter derived from a resolved scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Select everything.
    All,
    /// Select rows matching the predicate.
    Matching(ScopePredicate),
}

impl ScopeFilter {
    /// Returns whether the sector passes the filter.
    #[must_use]
    pub fn allows_sector(&self, tree: &OrganizationTree, sector: &Sector) -> bool {
        match self {
            Self::All => true,
            Self::Matching(predicate) => predicate.matches_sector(tree, sector),
        }
    }

    /// Returns whether the employee's sector passes the filter.
    #[must_use]
    pub fn allows_employee(&self, tree: &OrganizationTree, employee: &Employee) -> bool {
        self.allows_anchor(tree, ScopeAnchor::Sector(employee.sector_id()))
    }

    /// Returns whether a grant target lies inside the filter.
    #[must_use]
    pub fn covers(&self, tree: &OrganizationTree, target: GrantTarget) -> bool {
        match self {
            Self::All => true,
            Self::Matching(predicate) => predicate.covers(tree, target),
        }
    }

    /// Returns whether the record's anchor passes. Unknown anchors are rejected.
    #[must_use]
    pub fn allows_anchor(&self, tree: &OrganizationTree, anchor: ScopeAnchor) -> bool {
        let Self::Matching(predicate) = self else {
            return true;
        };

        let sector_id = match anchor {
            ScopeAnchor::Sector(id) => Some(id),
            ScopeAnchor::Employee(id) => tree.employee(id).map(Employee::sector_id),
        };

        sector_id
            .and_then(|id| tree.sector(id))
            .is_some_and(|sector| predicate.matches_sector(tree, sector))
    }

    /// Keeps the records that pass the filter, preserving order.
    #[must_use]
    pub fn apply<R: ScopedRecord>(&self, tree: &OrganizationTree, records: Vec<R>) -> Vec<R> {
        records
            .into_iter()
            .filter(|record| self.allows_anchor(tree, record.scope_anchor()))
            .collect()
    }
}

#[cfg(test)]
mod tests;
