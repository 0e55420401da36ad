//! Organizational units and the in-memory hierarchy view.
//!
//! The store is the owner of these records; the types here only validate what
//! callers construct and tolerate the legacy shapes found in historical rows.

use std::collections::HashMap;

use frequencia_core::{AppError, AppResult, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};

use crate::{AgencyId, DepartmentId, EmployeeId, GrantTarget, MunicipalityId, SectorId};

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

/// Root organizational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    id: MunicipalityId,
    name: NonEmptyString,
    tax_id: Option<String>,
    city: Option<String>,
    state_code: Option<String>,
}

impl Municipality {
    /// Creates a validated municipality.
    pub fn new(
        id: MunicipalityId,
        name: impl Into<String>,
        tax_id: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            tax_id: normalize_optional(tax_id),
            city: None,
            state_code: None,
        })
    }

    /// Attaches address information.
    #[must_use]
    pub fn with_location(mut self, city: Option<String>, state_code: Option<String>) -> Self {
        self.city = normalize_optional(city);
        self.state_code = normalize_optional(state_code).map(|value| value.to_uppercase());
        self
    }

    /// Returns the municipality identifier.
    #[must_use]
    pub fn id(&self) -> MunicipalityId {
        self.id
    }

    /// Returns the municipality name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the tax id, if registered.
    #[must_use]
    pub fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }

    /// Returns the city, if registered.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Returns the two-letter state code, if registered.
    #[must_use]
    pub fn state_code(&self) -> Option<&str> {
        self.state_code.as_deref()
    }
}

/// Secretariat belonging to a municipality.
///
/// Some historical rows file a department under an agency instead; the
/// municipality is then reached through that agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    id: DepartmentId,
    name: NonEmptyString,
    municipality_id: Option<MunicipalityId>,
    agency_id: Option<AgencyId>,
}

impl Department {
    /// Creates a validated department under a municipality.
    pub fn new(
        id: DepartmentId,
        name: impl Into<String>,
        municipality_id: MunicipalityId,
    ) -> AppResult<Self> {
        Self::from_stored(id, name, Some(municipality_id))
    }

    /// Rebuilds a stored department. Historical rows may lack the municipality.
    pub fn from_stored(
        id: DepartmentId,
        name: impl Into<String>,
        municipality_id: Option<MunicipalityId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            municipality_id,
            agency_id: None,
        })
    }

    /// Attaches the agency of an inverted legacy row.
    #[must_use]
    pub fn with_agency(mut self, agency_id: Option<AgencyId>) -> Self {
        self.agency_id = agency_id;
        self
    }

    /// Returns the department identifier.
    #[must_use]
    pub fn id(&self) -> DepartmentId {
        self.id
    }

    /// Returns the department name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning municipality.
    #[must_use]
    pub fn municipality_id(&self) -> Option<MunicipalityId> {
        self.municipality_id
    }

    /// Returns the agency an inverted legacy row hangs from.
    #[must_use]
    pub fn agency_id(&self) -> Option<AgencyId> {
        self.agency_id
    }
}

/// Agency (school, clinic, administrative body) inside a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    id: AgencyId,
    name: NonEmptyString,
    department_id: Option<DepartmentId>,
    municipality_id: Option<MunicipalityId>,
}

impl Agency {
    /// Creates a validated agency under a department.
    pub fn new(id: AgencyId, name: impl Into<String>, department_id: DepartmentId) -> AppResult<Self> {
        Self::from_stored(id, name, Some(department_id), None)
    }

    /// Rebuilds a stored agency.
    ///
    /// Legacy agencies may have no department and may hang directly from a
    /// municipality.
    pub fn from_stored(
        id: AgencyId,
        name: impl Into<String>,
        department_id: Option<DepartmentId>,
        municipality_id: Option<MunicipalityId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            department_id,
            municipality_id,
        })
    }

    /// Returns the agency identifier.
    #[must_use]
    pub fn id(&self) -> AgencyId {
        self.id
    }

    /// Returns the agency name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning department.
    #[must_use]
    pub fn department_id(&self) -> Option<DepartmentId> {
        self.department_id
    }

    /// Returns the municipality referenced directly by legacy rows.
    #[must_use]
    pub fn municipality_id(&self) -> Option<MunicipalityId> {
        self.municipality_id
    }
}

/// The single parent a sector may be created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SectorParent {
    /// Sector directly under a municipality.
    Municipality(MunicipalityId),
    /// Sector directly under a department.
    Department(DepartmentId),
    /// Sector under an agency.
    Agency(AgencyId),
}

/// Unit employees belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    id: SectorId,
    name: NonEmptyString,
    municipality_id: Option<MunicipalityId>,
    department_id: Option<DepartmentId>,
    agency_id: Option<AgencyId>,
    legacy_department_id: Option<DepartmentId>,
    head_employee_id: Option<EmployeeId>,
}

impl Sector {
    /// Creates a sector under exactly one parent.
    pub fn new(id: SectorId, name: impl Into<String>, parent: SectorParent) -> AppResult<Self> {
        let (municipality_id, department_id, agency_id) = match parent {
            SectorParent::Municipality(value) => (Some(value), None, None),
            SectorParent::Department(value) => (None, Some(value), None),
            SectorParent::Agency(value) => (None, None, Some(value)),
        };

        Self::from_stored(id, name, municipality_id, department_id, agency_id)
    }

    /// Creates a sector from raw parent columns, enforcing that exactly one is set.
    pub fn from_columns(
        id: SectorId,
        name: impl Into<String>,
        municipality_id: Option<MunicipalityId>,
        department_id: Option<DepartmentId>,
        agency_id: Option<AgencyId>,
    ) -> AppResult<Self> {
        let populated = [
            municipality_id.is_some(),
            department_id.is_some(),
            agency_id.is_some(),
        ]
        .into_iter()
        .filter(|value| *value)
        .count();

        if populated != 1 {
            return Err(AppError::Validation(format!(
                "sector must reference exactly one parent among municipality, department and agency, got {populated}"
            )));
        }

        Self::from_stored(id, name, municipality_id, department_id, agency_id)
    }

    /// Rebuilds a stored sector without enforcing the single-parent rule.
    pub fn from_stored(
        id: SectorId,
        name: impl Into<String>,
        municipality_id: Option<MunicipalityId>,
        department_id: Option<DepartmentId>,
        agency_id: Option<AgencyId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            municipality_id,
            department_id,
            agency_id,
            legacy_department_id: None,
            head_employee_id: None,
        })
    }

    /// Attaches the legacy flat department reference.
    #[must_use]
    pub fn with_legacy_department(mut self, department_id: Option<DepartmentId>) -> Self {
        self.legacy_department_id = department_id;
        self
    }

    /// Attaches the head-of-sector pointer.
    #[must_use]
    pub fn with_head(mut self, employee_id: Option<EmployeeId>) -> Self {
        self.head_employee_id = employee_id;
        self
    }

    /// Returns the sector identifier.
    #[must_use]
    pub fn id(&self) -> SectorId {
        self.id
    }

    /// Returns the sector name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the directly referenced municipality.
    #[must_use]
    pub fn municipality_id(&self) -> Option<MunicipalityId> {
        self.municipality_id
    }

    /// Returns the directly referenced department.
    #[must_use]
    pub fn department_id(&self) -> Option<DepartmentId> {
        self.department_id
    }

    /// Returns the referenced agency.
    #[must_use]
    pub fn agency_id(&self) -> Option<AgencyId> {
        self.agency_id
    }

    /// Returns the legacy flat department reference.
    #[must_use]
    pub fn legacy_department_id(&self) -> Option<DepartmentId> {
        self.legacy_department_id
    }

    /// Returns the authoritative head-of-sector pointer.
    #[must_use]
    pub fn head_employee_id(&self) -> Option<EmployeeId> {
        self.head_employee_id
    }

    /// Returns the parent when exactly one parent column is populated.
    #[must_use]
    pub fn parent(&self) -> Option<SectorParent> {
        match (self.municipality_id, self.department_id, self.agency_id) {
            (Some(value), None, None) => Some(SectorParent::Municipality(value)),
            (None, Some(value), None) => Some(SectorParent::Department(value)),
            (None, None, Some(value)) => Some(SectorParent::Agency(value)),
            _ => None,
        }
    }
}

/// Personnel record attached to a sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    sector_id: SectorId,
    name: NonEmptyString,
    registration: NonEmptyString,
    job_title: String,
    user_id: Option<UserId>,
    is_sector_head: bool,
}

impl Employee {
    /// Creates a validated employee.
    pub fn new(
        id: EmployeeId,
        sector_id: SectorId,
        name: impl Into<String>,
        registration: impl Into<String>,
        job_title: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            sector_id,
            name: NonEmptyString::new(name)?,
            registration: NonEmptyString::new(registration)?,
            job_title: job_title.into().trim().to_owned(),
            user_id: None,
            is_sector_head: false,
        })
    }

    /// Links the employee to a login account.
    #[must_use]
    pub fn with_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Sets the informational head-of-sector flag.
    #[must_use]
    pub fn with_sector_head_flag(mut self, is_sector_head: bool) -> Self {
        self.is_sector_head = is_sector_head;
        self
    }

    /// Returns the employee identifier.
    #[must_use]
    pub fn id(&self) -> EmployeeId {
        self.id
    }

    /// Returns the sector the employee belongs to.
    #[must_use]
    pub fn sector_id(&self) -> SectorId {
        self.sector_id
    }

    /// Returns the employee name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the registration number.
    #[must_use]
    pub fn registration(&self) -> &NonEmptyString {
        &self.registration
    }

    /// Returns the job title as registered.
    #[must_use]
    pub fn job_title(&self) -> &str {
        self.job_title.as_str()
    }

    /// Returns the job title in comparison form.
    #[must_use]
    pub fn normalized_job_title(&self) -> String {
        normalize_job_title(self.job_title.as_str())
    }

    /// Returns the linked login account.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the informational head-of-sector flag.
    #[must_use]
    pub fn is_sector_head(&self) -> bool {
        self.is_sector_head
    }
}

/// Normalizes a job title for case-insensitive comparison.
#[must_use]
pub fn normalize_job_title(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Read-only snapshot of the organization tree.
#[derive(Debug, Clone, Default)]
pub struct OrganizationTree {
    municipalities: HashMap<MunicipalityId, Municipality>,
    departments: HashMap<DepartmentId, Department>,
    agencies: HashMap<AgencyId, Agency>,
    sectors: HashMap<SectorId, Sector>,
    employees: HashMap<EmployeeId, Employee>,
    employees_by_user: HashMap<UserId, EmployeeId>,
}

impl OrganizationTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a municipality.
    pub fn insert_municipality(&mut self, municipality: Municipality) {
        self.municipalities.insert(municipality.id(), municipality);
    }

    /// Adds or replaces a department.
    pub fn insert_department(&mut self, department: Department) {
        self.departments.insert(department.id(), department);
    }

    /// Adds or replaces an agency.
    pub fn insert_agency(&mut self, agency: Agency) {
        self.agencies.insert(agency.id(), agency);
    }

    /// Adds or replaces a sector.
    pub fn insert_sector(&mut self, sector: Sector) {
        self.sectors.insert(sector.id(), sector);
    }

    /// Adds or replaces an employee.
    ///
    /// Rejects a second flagged head in the same sector and a login account
    /// already linked to another employee.
    pub fn insert_employee(&mut self, employee: Employee) -> AppResult<()> {
        if employee.is_sector_head() {
            let other_head = self.employees.values().find(|stored| {
                stored.id() != employee.id()
                    && stored.sector_id() == employee.sector_id()
                    && stored.is_sector_head()
            });
            if let Some(other_head) = other_head {
                return Err(AppError::Conflict(format!(
                    "sector '{}' already has head employee '{}'",
                    employee.sector_id(),
                    other_head.id()
                )));
            }
        }

        if let Some(user_id) = employee.user_id() {
            if let Some(linked) = self.employees_by_user.get(&user_id) {
                if *linked != employee.id() {
                    return Err(AppError::Conflict(format!(
                        "user '{user_id}' is already linked to employee '{linked}'"
                    )));
                }
            }
        }

        if let Some(previous) = self.employees.get(&employee.id()) {
            if let Some(previous_user_id) = previous.user_id() {
                self.employees_by_user.remove(&previous_user_id);
            }
        }
        if let Some(user_id) = employee.user_id() {
            self.employees_by_user.insert(user_id, employee.id());
        }
        self.employees.insert(employee.id(), employee);
        Ok(())
    }

    /// Makes `employee_id` the head of `sector_id`, keeping the flag consistent.
    pub fn assign_sector_head(
        &mut self,
        sector_id: SectorId,
        employee_id: EmployeeId,
    ) -> AppResult<()> {
        let Some(employee) = self.employees.get(&employee_id) else {
            return Err(AppError::NotFound(format!(
                "employee '{employee_id}' does not exist"
            )));
        };
        if employee.sector_id() != sector_id {
            return Err(AppError::Validation(format!(
                "employee '{employee_id}' does not belong to sector '{sector_id}'"
            )));
        }
        let Some(sector) = self.sectors.get_mut(&sector_id) else {
            return Err(AppError::NotFound(format!(
                "sector '{sector_id}' does not exist"
            )));
        };

        sector.head_employee_id = Some(employee_id);
        for stored in self.employees.values_mut() {
            if stored.sector_id() == sector_id {
                stored.is_sector_head = stored.id() == employee_id;
            }
        }

        Ok(())
    }

    /// Returns a municipality by id.
    #[must_use]
    pub fn municipality(&self, id: MunicipalityId) -> Option<&Municipality> {
        self.municipalities.get(&id)
    }

    /// Returns a department by id.
    #[must_use]
    pub fn department(&self, id: DepartmentId) -> Option<&Department> {
        self.departments.get(&id)
    }

    /// Returns an agency by id.
    #[must_use]
    pub fn agency(&self, id: AgencyId) -> Option<&Agency> {
        self.agencies.get(&id)
    }

    /// Returns a sector by id.
    #[must_use]
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(&id)
    }

    /// Returns an employee by id.
    #[must_use]
    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.get(&id)
    }

    /// Returns the employee linked to a login account.
    #[must_use]
    pub fn employee_for_user(&self, user_id: UserId) -> Option<&Employee> {
        self.employees_by_user
            .get(&user_id)
            .and_then(|employee_id| self.employees.get(employee_id))
    }

    /// Returns the current head of a sector through the sector pointer.
    #[must_use]
    pub fn sector_head(&self, sector_id: SectorId) -> Option<&Employee> {
        self.sectors
            .get(&sector_id)
            .and_then(Sector::head_employee_id)
            .and_then(|employee_id| self.employees.get(&employee_id))
    }

    /// Iterates over every sector.
    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.values()
    }

    /// Iterates over every employee.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    /// Returns whether the grant target exists in this snapshot.
    #[must_use]
    pub fn contains_target(&self, target: GrantTarget) -> bool {
        self.target_name(target).is_some()
    }

    /// Returns the display name of a grant target.
    #[must_use]
    pub fn target_name(&self, target: GrantTarget) -> Option<&str> {
        match target {
            GrantTarget::Municipality(id) => self.municipality(id).map(|value| value.name().as_str()),
            GrantTarget::Department(id) => self.department(id).map(|value| value.name().as_str()),
            GrantTarget::Agency(id) => self.agency(id).map(|value| value.name().as_str()),
            GrantTarget::Sector(id) => self.sector(id).map(|value| value.name().as_str()),
        }
    }
}
