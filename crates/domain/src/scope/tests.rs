use std::collections::BTreeSet;

use chrono::Utc;
use proptest::prelude::*;

use super::{EntityIdSets, ResolvedScope, ScopeFilter, ScopePath, ScopePredicate, ScopeSets};
use crate::{
    AccessLevel, Agency, AgencyId, Department, DepartmentId, Employee, EmployeeId, GrantTarget, Municipality,
    MunicipalityId, OrganizationTree, Sector, SectorId, SectorParent, Timesheet, TimesheetId,
};

struct Fixture {
    tree: OrganizationTree,
    municipalities: [MunicipalityId; 2],
    departments: [DepartmentId; 3],
    agencies: [AgencyId; 3],
    sectors: [SectorId; 6],
}

impl Fixture {
    // m0 -> d0 -> a0 ; m0 -> d1 -> a1 ; m1 -> d2 ; legacy a2 -> m1
    // s0: d0 direct, s1: a0, s2: a1, s3: m1 direct, s4: legacy flat d2, s5: a2
    fn new() -> Self {
        let municipalities = [MunicipalityId::new(), MunicipalityId::new()];
        let departments = [DepartmentId::new(), DepartmentId::new(), DepartmentId::new()];
        let agencies = [AgencyId::new(), AgencyId::new(), AgencyId::new()];
        let sectors = [
            SectorId::new(),
            SectorId::new(),
            SectorId::new(),
            SectorId::new(),
            SectorId::new(),
            SectorId::new(),
        ];

        let mut tree = OrganizationTree::new();
        for (index, id) in municipalities.iter().enumerate() {
            tree.insert_municipality(
                Municipality::new(*id, format!("Prefeitura {index}"), None)
                    .unwrap_or_else(|_| unreachable!()),
            );
        }
        let department_parents = [municipalities[0], municipalities[0], municipalities[1]];
        for (index, (id, parent)) in departments.iter().zip(department_parents).enumerate() {
            tree.insert_department(
                Department::new(*id, format!("Secretaria {index}"), parent)
                    .unwrap_or_else(|_| unreachable!()),
            );
        }
        tree.insert_agency(
            Agency::new(agencies[0], "Escola A", departments[0]).unwrap_or_else(|_| unreachable!()),
        );
        tree.insert_agency(
            Agency::new(agencies[1], "Posto B", departments[1]).unwrap_or_else(|_| unreachable!()),
        );
        tree.insert_agency(
            Agency::from_stored(agencies[2], "Escola Rural", None, Some(municipalities[1]))
                .unwrap_or_else(|_| unreachable!()),
        );

        let sector_rows = [
            Sector::new(sectors[0], "Gabinete", SectorParent::Department(departments[0])),
            Sector::new(sectors[1], "Secretaria Escolar", SectorParent::Agency(agencies[0])),
            Sector::new(sectors[2], "Recepcao", SectorParent::Agency(agencies[1])),
            Sector::new(sectors[3], "Protocolo", SectorParent::Municipality(municipalities[1])),
            Sector::from_stored(sectors[4], "Arquivo", None, None, None)
                .map(|sector| sector.with_legacy_department(Some(departments[2]))),
            Sector::new(sectors[5], "Cozinha", SectorParent::Agency(agencies[2])),
        ];
        for sector in sector_rows {
            tree.insert_sector(sector.unwrap_or_else(|_| unreachable!()));
        }

        Self {
            tree,
            municipalities,
            departments,
            agencies,
            sectors,
        }
    }

    fn targets(&self) -> Vec<GrantTarget> {
        let mut targets = Vec::new();
        targets.extend(self.municipalities.map(GrantTarget::Municipality));
        targets.extend(self.departments.map(GrantTarget::Department));
        targets.extend(self.agencies.map(GrantTarget::Agency));
        targets.extend(self.sectors.map(GrantTarget::Sector));
        targets
    }

    fn visible_sectors(&self, granted: &[GrantTarget]) -> BTreeSet<SectorId> {
        let mut sets = EntityIdSets::default();
        for target in granted {
            sets.insert_target(*target);
        }
        let filter = ScopeFilter::Matching(ScopePredicate::from_granted(sets));

        self.tree
            .sectors()
            .filter(|sector| filter.allows_sector(&self.tree, sector))
            .map(Sector::id)
            .collect()
    }
}

#[test]
fn department_grant_covers_direct_and_agency_sectors_only() {
    let fixture = Fixture::new();

    let visible = fixture.visible_sectors(&[GrantTarget::Department(fixture.departments[0])]);

    assert_eq!(
        visible,
        BTreeSet::from([fixture.sectors[0], fixture.sectors[1]])
    );
}

#[test]
fn municipality_grant_reaches_every_legacy_shape() {
    let fixture = Fixture::new();

    let visible = fixture.visible_sectors(&[GrantTarget::Municipality(fixture.municipalities[1])]);

    assert_eq!(
        visible,
        BTreeSet::from([fixture.sectors[3], fixture.sectors[4], fixture.sectors[5]])
    );
}

#[test]
fn empty_predicate_matches_nothing() {
    let fixture = Fixture::new();
    let predicate = ScopePredicate::from_granted(EntityIdSets::default());

    assert!(predicate.is_empty());
    assert!(fixture.visible_sectors(&[]).is_empty());
}

#[test]
fn predicate_keeps_only_paths_with_ids() {
    let fixture = Fixture::new();
    let mut sets = EntityIdSets::default();
    sets.insert_target(GrantTarget::Agency(fixture.agencies[0]));

    let predicate = ScopePredicate::from_granted(sets);

    assert_eq!(
        predicate.paths(),
        &[ScopePath::SectorAgency, ScopePath::SectorDepartmentAgency]
    );
}

#[test]
fn sectors_of_inverted_departments_follow_their_agency() {
    let mut fixture = Fixture::new();
    let under_school = DepartmentId::new();
    let under_rural_school = DepartmentId::new();
    let school_sector = SectorId::new();
    let rural_sector = SectorId::new();
    for (department_id, agency_id) in [
        (under_school, fixture.agencies[0]),
        (under_rural_school, fixture.agencies[2]),
    ] {
        fixture.tree.insert_department(
            Department::from_stored(department_id, "Departamento", None)
                .unwrap_or_else(|_| unreachable!())
                .with_agency(Some(agency_id)),
        );
    }
    for (sector_id, department_id) in [
        (school_sector, under_school),
        (rural_sector, under_rural_school),
    ] {
        fixture.tree.insert_sector(
            Sector::new(sector_id, "Biblioteca", SectorParent::Department(department_id))
                .unwrap_or_else(|_| unreachable!()),
        );
    }

    let by_first_municipality =
        fixture.visible_sectors(&[GrantTarget::Municipality(fixture.municipalities[0])]);
    let by_second_municipality =
        fixture.visible_sectors(&[GrantTarget::Municipality(fixture.municipalities[1])]);
    let by_school = fixture.visible_sectors(&[GrantTarget::Agency(fixture.agencies[0])]);

    assert!(by_first_municipality.contains(&school_sector));
    assert!(!by_first_municipality.contains(&rural_sector));
    assert!(by_second_municipality.contains(&rural_sector));
    assert!(!by_second_municipality.contains(&school_sector));
    assert_eq!(by_school, BTreeSet::from([fixture.sectors[1], school_sector]));

    let mut sets = EntityIdSets::default();
    sets.insert_target(GrantTarget::Municipality(fixture.municipalities[1]));
    let predicate = ScopePredicate::from_granted(sets);
    assert!(predicate.covers(&fixture.tree, GrantTarget::Department(under_rural_school)));
    assert!(!predicate.covers(&fixture.tree, GrantTarget::Department(under_school)));
}

#[test]
fn child_grant_never_covers_its_ancestors() {
    let fixture = Fixture::new();
    let mut sets = EntityIdSets::default();
    sets.insert_target(GrantTarget::Sector(fixture.sectors[1]));
    let predicate = ScopePredicate::from_granted(sets);

    assert!(predicate.covers(&fixture.tree, GrantTarget::Sector(fixture.sectors[1])));
    assert!(!predicate.covers(&fixture.tree, GrantTarget::Agency(fixture.agencies[0])));
    assert!(!predicate.covers(&fixture.tree, GrantTarget::Department(fixture.departments[0])));
    assert!(!predicate.covers(
        &fixture.tree,
        GrantTarget::Municipality(fixture.municipalities[0])
    ));
}

#[test]
fn ancestor_grants_cover_descendant_targets() {
    let fixture = Fixture::new();
    let mut sets = EntityIdSets::default();
    sets.insert_target(GrantTarget::Municipality(fixture.municipalities[0]));
    let predicate = ScopePredicate::from_granted(sets);

    assert!(predicate.covers(&fixture.tree, GrantTarget::Department(fixture.departments[1])));
    assert!(predicate.covers(&fixture.tree, GrantTarget::Agency(fixture.agencies[1])));
    assert!(!predicate.covers(&fixture.tree, GrantTarget::Agency(fixture.agencies[2])));
}

fn sector_scope(level: AccessLevel, sector_id: SectorId, tree: &OrganizationTree) -> ScopeSets {
    let mut sets = ScopeSets::new(level);
    sets.grant(GrantTarget::Sector(sector_id));
    if let Some(sector) = tree.sector(sector_id) {
        sets.expose_ancestors(&tree.resolve_sector_chain(sector));
    }
    sets
}

#[test]
fn ancestors_are_readable_at_read_level() {
    let fixture = Fixture::new();
    let sets = sector_scope(AccessLevel::Read, fixture.sectors[1], &fixture.tree);

    let visible = sets.visible();
    assert!(visible.departments.contains(&fixture.departments[0]));
    assert!(visible.municipalities.contains(&fixture.municipalities[0]));
    assert!(!sets.granted().departments.contains(&fixture.departments[0]));
    assert_eq!(sets.effective(), visible);

    let filter = ResolvedScope::Restricted(sets).filter();
    assert!(filter.covers(&fixture.tree, GrantTarget::Department(fixture.departments[0])));
    for index in [0, 1, 2] {
        let sector = fixture.tree.sector(fixture.sectors[index]);
        assert!(sector.is_some_and(|sector| filter.allows_sector(&fixture.tree, sector)));
    }
    let other_municipality = fixture.tree.sector(fixture.sectors[3]);
    assert!(!other_municipality.is_some_and(|sector| filter.allows_sector(&fixture.tree, sector)));
}

#[test]
fn ancestors_never_widen_manage_scope() {
    let fixture = Fixture::new();
    let sets = sector_scope(AccessLevel::Manage, fixture.sectors[1], &fixture.tree);

    assert!(sets.visible().departments.contains(&fixture.departments[0]));
    assert_eq!(&sets.effective(), sets.granted());

    let filter = ResolvedScope::Restricted(sets).filter();
    assert!(!filter.covers(&fixture.tree, GrantTarget::Department(fixture.departments[0])));
    assert!(filter.covers(&fixture.tree, GrantTarget::Sector(fixture.sectors[1])));
    assert!(!filter.covers(&fixture.tree, GrantTarget::Sector(fixture.sectors[0])));
}

#[test]
fn records_are_filtered_through_their_employee() {
    let mut fixture = Fixture::new();
    let inside = Employee::new(EmployeeId::new(), fixture.sectors[1], "Ana", "001", "Professora")
        .unwrap_or_else(|_| unreachable!());
    let outside = Employee::new(EmployeeId::new(), fixture.sectors[2], "Bia", "002", "Enfermeira")
        .unwrap_or_else(|_| unreachable!());
    let inside_id = inside.id();
    let outside_id = outside.id();
    assert!(fixture.tree.insert_employee(inside).is_ok());
    assert!(fixture.tree.insert_employee(outside).is_ok());

    let sheets: Vec<Timesheet> = [inside_id, outside_id, EmployeeId::new()]
        .into_iter()
        .map(|employee_id| {
            Timesheet::new(TimesheetId::new(), employee_id, 3, 2024, Utc::now())
                .unwrap_or_else(|_| unreachable!())
        })
        .collect();

    let mut sets = EntityIdSets::default();
    sets.insert_target(GrantTarget::Agency(fixture.agencies[0]));
    let filter = ScopeFilter::Matching(ScopePredicate::from_granted(sets));

    let kept = filter.apply(&fixture.tree, sheets.clone());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].employee_id(), inside_id);

    assert_eq!(ScopeFilter::All.apply(&fixture.tree, sheets).len(), 3);
}

#[test]
fn unrestricted_scope_is_never_empty() {
    assert!(!ResolvedScope::Unrestricted.is_empty());
    assert!(ResolvedScope::Restricted(ScopeSets::new(AccessLevel::Read)).is_empty());
    assert_eq!(ResolvedScope::Unrestricted.filter(), ScopeFilter::All);
}

proptest! {
    #[test]
    fn grants_contribute_exactly_their_own_sectors(
        left in proptest::collection::vec(0usize..14, 0..6),
        right in proptest::collection::vec(0usize..14, 0..6),
    ) {
        let fixture = Fixture::new();
        let targets = fixture.targets();
        let left: Vec<GrantTarget> = left.into_iter().map(|index| targets[index]).collect();
        let right: Vec<GrantTarget> = right.into_iter().map(|index| targets[index]).collect();
        let combined: Vec<GrantTarget> = left.iter().chain(right.iter()).copied().collect();

        let union: BTreeSet<SectorId> = fixture
            .visible_sectors(&left)
            .union(&fixture.visible_sectors(&right))
            .copied()
            .collect();

        prop_assert_eq!(fixture.visible_sectors(&combined), union);
    }

    #[test]
    fn predicate_is_stable_for_the_same_grants(
        granted in proptest::collection::vec(0usize..14, 0..8),
    ) {
        let fixture = Fixture::new();
        let targets = fixture.targets();
        let granted: Vec<GrantTarget> = granted.into_iter().map(|index| targets[index]).collect();

        prop_assert_eq!(fixture.visible_sectors(&granted), fixture.visible_sectors(&granted));
    }
}
