use frequencia_core::{AppError, AppResult, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AccessLevel, AgencyId, DepartmentId, ResolvedChain, RolePermissionId, SectorId,
    normalize_job_title,
};

/// Job titles allowed to manage employees when no explicit role permissions exist.
pub const PRIVILEGED_JOB_TITLES: &[&str] = &[
    "diretor",
    "diretor(a)",
    "coordenador",
    "coordenador(a)",
    "secretario",
    "secretário",
    "secretario(a)",
    "secretário(a)",
    "secretaria",
    "gestor",
    "gestor(a)",
    "admin",
    "administrador",
    "director",
    "coordinator",
    "manager",
    "administrator",
];

/// Returns whether a job title belongs to the privileged allow-list.
#[must_use]
pub fn is_privileged_job_title(job_title: &str) -> bool {
    let normalized = normalize_job_title(job_title);
    !normalized.is_empty() && PRIVILEGED_JOB_TITLES.contains(&normalized.as_str())
}

/// Optional organizational restriction of a role permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RoleScopeRestriction {
    /// Applies only to employees resolved under this department.
    Department(DepartmentId),
    /// Applies only to employees resolved under this agency.
    Agency(AgencyId),
    /// Applies only to employees of this sector.
    Sector(SectorId),
}

/// Grant of a level over employees holding a given job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    id: RolePermissionId,
    user_id: UserId,
    job_title: NonEmptyString,
    level: AccessLevel,
    restriction: Option<RoleScopeRestriction>,
}

impl RolePermission {
    /// Creates a validated role permission.
    pub fn new(
        id: RolePermissionId,
        user_id: UserId,
        job_title: impl Into<String>,
        level: AccessLevel,
        restriction: Option<RoleScopeRestriction>,
    ) -> AppResult<Self> {
        let job_title = job_title.into().trim().to_owned();
        Ok(Self {
            id,
            user_id,
            job_title: NonEmptyString::new(job_title)?,
            level,
            restriction,
        })
    }

    /// Builds a role permission from nullable restriction columns; at most one may be set.
    pub fn from_columns(
        id: RolePermissionId,
        user_id: UserId,
        job_title: impl Into<String>,
        level: AccessLevel,
        department_id: Option<Uuid>,
        agency_id: Option<Uuid>,
        sector_id: Option<Uuid>,
    ) -> AppResult<Self> {
        let restriction = match (department_id, agency_id, sector_id) {
            (None, None, None) => None,
            (Some(id), None, None) => Some(RoleScopeRestriction::Department(DepartmentId::from_uuid(id))),
            (None, Some(id), None) => Some(RoleScopeRestriction::Agency(AgencyId::from_uuid(id))),
            (None, None, Some(id)) => Some(RoleScopeRestriction::Sector(SectorId::from_uuid(id))),
            _ => {
                return Err(AppError::Validation(
                    "role permission may be restricted to only one of department, agency or sector"
                        .to_owned(),
                ));
            }
        };

        Self::new(id, user_id, job_title, level, restriction)
    }

    /// Returns the row identifier.
    #[must_use]
    pub fn id(&self) -> RolePermissionId {
        self.id
    }

    /// Returns the grantee.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the job title as registered.
    #[must_use]
    pub fn job_title(&self) -> &NonEmptyString {
        &self.job_title
    }

    /// Returns the granted level.
    #[must_use]
    pub fn level(&self) -> AccessLevel {
        self.level
    }

    /// Returns the optional restriction.
    #[must_use]
    pub fn restriction(&self) -> Option<RoleScopeRestriction> {
        self.restriction
    }

    /// Compares job titles case-insensitively, ignoring surrounding whitespace.
    #[must_use]
    pub fn matches_job_title(&self, job_title: &str) -> bool {
        normalize_job_title(self.job_title.as_str()) == normalize_job_title(job_title)
    }

    /// Returns whether the restriction admits an employee of `sector_id`.
    #[must_use]
    pub fn applies_to(&self, sector_id: SectorId, chain: &ResolvedChain) -> bool {
        match self.restriction {
            None => true,
            Some(RoleScopeRestriction::Department(id)) => chain.department_id == Some(id),
            Some(RoleScopeRestriction::Agency(id)) => chain.agency_id == Some(id),
            Some(RoleScopeRestriction::Sector(id)) => sector_id == id,
        }
    }
}

#[cfg(test)]
mod tests {
    use frequencia_core::UserId;
    use uuid::Uuid;

    use super::{RolePermission, RoleScopeRestriction, is_privileged_job_title};
    use crate::{AccessLevel, DepartmentId, ResolvedChain, RolePermissionId, SectorId};

    #[test]
    fn privileged_titles_ignore_case_and_padding() {
        assert!(is_privileged_job_title("  Coordenador "));
        assert!(is_privileged_job_title("DIRECTOR"));
        assert!(!is_privileged_job_title("auxiliar"));
        assert!(!is_privileged_job_title(""));
    }

    #[test]
    fn two_restrictions_are_rejected() {
        let result = RolePermission::from_columns(
            RolePermissionId::new(),
            UserId::new(),
            "Professor",
            AccessLevel::Manage,
            Some(Uuid::new_v4()),
            None,
            Some(Uuid::new_v4()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn department_restriction_matches_resolved_department() {
        let department_id = DepartmentId::new();
        let permission = RolePermission::new(
            RolePermissionId::new(),
            UserId::new(),
            "Professor",
            AccessLevel::Manage,
            Some(RoleScopeRestriction::Department(department_id)),
        )
        .unwrap_or_else(|_| unreachable!());

        let inside = ResolvedChain {
            department_id: Some(department_id),
            ..ResolvedChain::default()
        };
        let outside = ResolvedChain {
            department_id: Some(DepartmentId::new()),
            ..ResolvedChain::default()
        };

        assert!(permission.matches_job_title("PROFESSOR "));
        assert!(permission.applies_to(SectorId::new(), &inside));
        assert!(!permission.applies_to(SectorId::new(), &outside));
    }
}
