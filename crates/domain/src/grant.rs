use std::str::FromStr;

use frequencia_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccessLevel, AgencyId, DepartmentId, GrantId, MunicipalityId, SectorId};

/// Hierarchy level a grant points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Municipality target.
    Municipality,
    /// Department target.
    Department,
    /// Agency target.
    Agency,
    /// Sector target.
    Sector,
}

impl TargetKind {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Municipality => "municipality",
            Self::Department => "department",
            Self::Agency => "agency",
            Self::Sector => "sector",
        }
    }

    /// Parses a transport value.
    pub fn parse_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for TargetKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "municipality" => Ok(Self::Municipality),
            "department" => Ok(Self::Department),
            "agency" => Ok(Self::Agency),
            "sector" => Ok(Self::Sector),
            _ => Err(AppError::Validation(format!(
                "unknown grant target kind '{value}'"
            ))),
        }
    }
}

/// The single entity a grant refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GrantTarget {
    /// Municipality target.
    Municipality(MunicipalityId),
    /// Department target.
    Department(DepartmentId),
    /// Agency target.
    Agency(AgencyId),
    /// Sector target.
    Sector(SectorId),
}

impl GrantTarget {
    /// Builds a target from nullable storage columns; exactly one must be set.
    pub fn from_columns(
        municipality_id: Option<Uuid>,
        department_id: Option<Uuid>,
        agency_id: Option<Uuid>,
        sector_id: Option<Uuid>,
    ) -> AppResult<Self> {
        match (municipality_id, department_id, agency_id, sector_id) {
            (Some(id), None, None, None) => Ok(Self::Municipality(MunicipalityId::from_uuid(id))),
            (None, Some(id), None, None) => Ok(Self::Department(DepartmentId::from_uuid(id))),
            (None, None, Some(id), None) => Ok(Self::Agency(AgencyId::from_uuid(id))),
            (None, None, None, Some(id)) => Ok(Self::Sector(SectorId::from_uuid(id))),
            (None, None, None, None) => Err(AppError::Validation(
                "grant must reference one of municipality, department, agency or sector".to_owned(),
            )),
            _ => Err(AppError::Validation(
                "grant must reference only one of municipality, department, agency or sector"
                    .to_owned(),
            )),
        }
    }

    /// Builds a target from a kind and raw identifier.
    #[must_use]
    pub fn from_kind_and_uuid(kind: TargetKind, id: Uuid) -> Self {
        match kind {
            TargetKind::Municipality => Self::Municipality(MunicipalityId::from_uuid(id)),
            TargetKind::Department => Self::Department(DepartmentId::from_uuid(id)),
            TargetKind::Agency => Self::Agency(AgencyId::from_uuid(id)),
            TargetKind::Sector => Self::Sector(SectorId::from_uuid(id)),
        }
    }

    /// Returns the target kind.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Municipality(_) => TargetKind::Municipality,
            Self::Department(_) => TargetKind::Department,
            Self::Agency(_) => TargetKind::Agency,
            Self::Sector(_) => TargetKind::Sector,
        }
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Municipality(id) => id.as_uuid(),
            Self::Department(id) => id.as_uuid(),
            Self::Agency(id) => id.as_uuid(),
            Self::Sector(id) => id.as_uuid(),
        }
    }

    /// Splits the target back into the four nullable storage columns.
    #[must_use]
    pub fn to_columns(&self) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>, Option<Uuid>) {
        match self {
            Self::Municipality(id) => (Some(id.as_uuid()), None, None, None),
            Self::Department(id) => (None, Some(id.as_uuid()), None, None),
            Self::Agency(id) => (None, None, Some(id.as_uuid()), None),
            Self::Sector(id) => (None, None, None, Some(id.as_uuid())),
        }
    }
}

/// Table a grant was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    /// Per-level municipality grants.
    LegacyMunicipality,
    /// Per-level department grants.
    LegacyDepartment,
    /// Per-level agency grants. Absent in some deployments.
    LegacyAgency,
    /// Per-level sector grants.
    LegacySector,
    /// Unified multi-target grants.
    Unified,
}

impl GrantSource {
    /// Returns a stable name for logs and transport.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegacyMunicipality => "legacy_municipality",
            Self::LegacyDepartment => "legacy_department",
            Self::LegacyAgency => "legacy_agency",
            Self::LegacySector => "legacy_sector",
            Self::Unified => "unified",
        }
    }
}

/// Normalized authorization record, whichever table it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Grantee.
    pub user_id: UserId,
    /// Granted entity.
    pub target: GrantTarget,
    /// Granted level.
    pub level: AccessLevel,
    /// Origin table.
    pub source: GrantSource,
}

/// Row of the unified grant table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedGrant {
    id: GrantId,
    user_id: UserId,
    target: GrantTarget,
    level: AccessLevel,
}

impl UnifiedGrant {
    /// Creates a unified grant row.
    #[must_use]
    pub fn new(id: GrantId, user_id: UserId, target: GrantTarget, level: AccessLevel) -> Self {
        Self {
            id,
            user_id,
            target,
            level,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub fn id(&self) -> GrantId {
        self.id
    }

    /// Returns the grantee.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the granted entity.
    #[must_use]
    pub fn target(&self) -> GrantTarget {
        self.target
    }

    /// Returns the granted level.
    #[must_use]
    pub fn level(&self) -> AccessLevel {
        self.level
    }

    /// Converts the row into the normalized grant shape.
    #[must_use]
    pub fn into_grant(self) -> Grant {
        Grant {
            user_id: self.user_id,
            target: self.target,
            level: self.level,
            source: GrantSource::Unified,
        }
    }
}
