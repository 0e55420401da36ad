//! Ancestor chain resolution over the organization tree.
//!
//! Current and legacy shapes are handled by one resolver that applies an
//! ordered list of strategies. Each strategy only fills slots that are still
//! empty, so earlier (more direct) references always win.

use serde::{Deserialize, Serialize};

use crate::{Agency, AgencyId, Department, DepartmentId, Employee, MunicipalityId, OrganizationTree, Sector};

/// One way of discovering ancestors of a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    /// References stored on the sector row itself.
    DirectField,
    /// References stored on the resolved agency.
    ViaAgency,
    /// References stored on the resolved department.
    ViaDepartment,
}

/// Fixed priority order used by [`OrganizationTree::resolve_sector_chain`].
pub const CHAIN_RESOLUTION_ORDER: [ChainStep; 3] = [
    ChainStep::DirectField,
    ChainStep::ViaAgency,
    ChainStep::ViaDepartment,
];

/// Effective ancestors of an organizational unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedChain {
    /// Resolved agency.
    pub agency_id: Option<AgencyId>,
    /// Resolved department.
    pub department_id: Option<DepartmentId>,
    /// Resolved municipality.
    pub municipality_id: Option<MunicipalityId>,
}

impl ResolvedChain {
    fn is_complete(&self) -> bool {
        self.agency_id.is_some() && self.department_id.is_some() && self.municipality_id.is_some()
    }

    fn apply(&mut self, step: ChainStep, tree: &OrganizationTree, sector: &Sector) {
        match step {
            ChainStep::DirectField => {
                self.agency_id = self.agency_id.or(sector.agency_id());
                self.department_id = self
                    .department_id
                    .or(sector.department_id())
                    .or(sector.legacy_department_id());
                self.municipality_id = self.municipality_id.or(sector.municipality_id());
            }
            ChainStep::ViaAgency => {
                if let Some(agency) = self.agency_id.and_then(|id| tree.agency(id)) {
                    self.fill_from_agency(agency);
                }
            }
            ChainStep::ViaDepartment => {
                if let Some(department) = self.department_id.and_then(|id| tree.department(id)) {
                    self.fill_from_department(tree, department);
                }
            }
        }
    }

    fn fill_from_agency(&mut self, agency: &Agency) {
        self.department_id = self.department_id.or(agency.department_id());
        self.municipality_id = self.municipality_id.or(agency.municipality_id());
    }

    fn fill_from_department(&mut self, tree: &OrganizationTree, department: &Department) {
        self.agency_id = self.agency_id.or(department.agency_id());
        self.municipality_id = self
            .municipality_id
            .or_else(|| tree.department_municipality(department));
    }
}

impl OrganizationTree {
    /// Resolves the (agency, department, municipality) chain of a sector.
    ///
    /// Missing links contribute nothing; the result is never an error.
    #[must_use]
    pub fn resolve_sector_chain(&self, sector: &Sector) -> ResolvedChain {
        let mut chain = ResolvedChain::default();
        for step in CHAIN_RESOLUTION_ORDER {
            if chain.is_complete() {
                break;
            }
            chain.apply(step, self, sector);
        }

        chain
    }

    /// Resolves the chain of an employee through its sector.
    #[must_use]
    pub fn resolve_employee_chain(&self, employee: &Employee) -> Option<ResolvedChain> {
        self.sector(employee.sector_id())
            .map(|sector| self.resolve_sector_chain(sector))
    }

    /// Resolves the ancestors of an agency.
    #[must_use]
    pub fn resolve_agency_chain(&self, agency: &Agency) -> ResolvedChain {
        let mut chain = ResolvedChain {
            agency_id: Some(agency.id()),
            ..ResolvedChain::default()
        };
        chain.fill_from_agency(agency);
        if let Some(department) = chain.department_id.and_then(|id| self.department(id)) {
            chain.fill_from_department(self, department);
        }

        chain
    }

    /// Resolves the ancestors of a department.
    #[must_use]
    pub fn resolve_department_chain(&self, department: &Department) -> ResolvedChain {
        let mut chain = ResolvedChain {
            department_id: Some(department.id()),
            ..ResolvedChain::default()
        };
        chain.fill_from_department(self, department);

        chain
    }

    /// Returns the municipality of a department.
    ///
    /// A department filed under an agency takes the agency's municipality,
    /// read from the agency itself or from the agency's own department. The
    /// walk stops after that one hop.
    #[must_use]
    pub fn department_municipality(&self, department: &Department) -> Option<MunicipalityId> {
        department.municipality_id().or_else(|| {
            let agency = department.agency_id().and_then(|id| self.agency(id))?;
            agency.municipality_id().or_else(|| {
                agency
                    .department_id()
                    .and_then(|id| self.department(id))
                    .and_then(Department::municipality_id)
            })
        })
    }
}
