use frequencia_application::{
    CreateGrantInput, CreateRolePermissionInput, GrantListEntry, GrantListQuery,
    RolePermissionListEntry,
};
use frequencia_core::{AppError, AppResult, UserId};
use frequencia_domain::{
    AccessLevel, AgencyId, DepartmentId, GrantTarget, RolePermission, RoleScopeRestriction,
    SectorId, TargetKind, UnifiedGrant,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string for administrative listings.
#[derive(Debug, Default, Deserialize)]
pub struct GrantListParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl From<GrantListParams> for GrantListQuery {
    fn from(params: GrantListParams) -> Self {
        let defaults = GrantListQuery::default();
        Self {
            search: params.q,
            limit: params.limit.unwrap_or(defaults.limit),
            offset: params.offset.unwrap_or(defaults.offset),
        }
    }
}

/// Incoming payload for unified grant creation.
#[derive(Debug, Deserialize)]
pub struct CreateGrantRequest {
    pub user_id: Uuid,
    pub target_type: String,
    pub target_id: Uuid,
    pub level: String,
}

impl CreateGrantRequest {
    pub fn into_input(self) -> AppResult<CreateGrantInput> {
        let kind = TargetKind::parse_transport(self.target_type.trim())?;

        Ok(CreateGrantInput {
            user_id: UserId::from_uuid(self.user_id),
            target: GrantTarget::from_kind_and_uuid(kind, self.target_id),
            level: AccessLevel::parse_transport(self.level.trim())?,
        })
    }
}

/// API representation of a unified grant.
#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub grant_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub target_type: &'static str,
    pub target_id: String,
    pub target_name: Option<String>,
    pub level: &'static str,
}

impl From<GrantListEntry> for GrantResponse {
    fn from(entry: GrantListEntry) -> Self {
        Self {
            grant_id: entry.grant_id.to_string(),
            user_id: entry.user_id.to_string(),
            username: Some(entry.username),
            target_type: entry.target.kind().as_str(),
            target_id: entry.target.uuid().to_string(),
            target_name: Some(entry.target_name),
            level: entry.level.as_str(),
        }
    }
}

impl From<UnifiedGrant> for GrantResponse {
    fn from(grant: UnifiedGrant) -> Self {
        Self {
            grant_id: grant.id().to_string(),
            user_id: grant.user_id().to_string(),
            username: None,
            target_type: grant.target().kind().as_str(),
            target_id: grant.target().uuid().to_string(),
            target_name: None,
            level: grant.level().as_str(),
        }
    }
}

/// Incoming payload for role permission creation.
#[derive(Debug, Deserialize)]
pub struct CreateRolePermissionRequest {
    pub user_id: Uuid,
    pub job_title: String,
    pub level: String,
    pub restriction_type: Option<String>,
    pub restriction_id: Option<Uuid>,
}

impl CreateRolePermissionRequest {
    pub fn into_input(self) -> AppResult<CreateRolePermissionInput> {
        let restriction = match (self.restriction_type.as_deref(), self.restriction_id) {
            (None, None) => None,
            (Some(restriction_type), Some(id)) => Some(restriction(restriction_type, id)?),
            _ => {
                return Err(AppError::Validation(
                    "restriction_type and restriction_id must be provided together".to_owned(),
                ));
            }
        };

        Ok(CreateRolePermissionInput {
            user_id: UserId::from_uuid(self.user_id),
            job_title: self.job_title,
            level: AccessLevel::parse_transport(self.level.trim())?,
            restriction,
        })
    }
}

fn restriction(restriction_type: &str, id: Uuid) -> AppResult<RoleScopeRestriction> {
    match TargetKind::parse_transport(restriction_type.trim())? {
        TargetKind::Department => Ok(RoleScopeRestriction::Department(DepartmentId::from_uuid(
            id,
        ))),
        TargetKind::Agency => Ok(RoleScopeRestriction::Agency(AgencyId::from_uuid(id))),
        TargetKind::Sector => Ok(RoleScopeRestriction::Sector(SectorId::from_uuid(id))),
        TargetKind::Municipality => Err(AppError::Validation(
            "role permissions cannot be restricted to a municipality".to_owned(),
        )),
    }
}

/// API representation of a role permission.
#[derive(Debug, Serialize)]
pub struct RolePermissionResponse {
    pub permission_id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub job_title: String,
    pub level: &'static str,
    pub restriction_type: Option<&'static str>,
    pub restriction_id: Option<String>,
}

impl From<RolePermissionListEntry> for RolePermissionResponse {
    fn from(entry: RolePermissionListEntry) -> Self {
        let mut response = Self::from(entry.permission);
        response.username = Some(entry.username);
        response
    }
}

impl From<RolePermission> for RolePermissionResponse {
    fn from(permission: RolePermission) -> Self {
        let (restriction_type, restriction_id) = match permission.restriction() {
            None => (None, None),
            Some(RoleScopeRestriction::Department(id)) => {
                (Some(TargetKind::Department.as_str()), Some(id.to_string()))
            }
            Some(RoleScopeRestriction::Agency(id)) => {
                (Some(TargetKind::Agency.as_str()), Some(id.to_string()))
            }
            Some(RoleScopeRestriction::Sector(id)) => {
                (Some(TargetKind::Sector.as_str()), Some(id.to_string()))
            }
        };

        Self {
            permission_id: permission.id().to_string(),
            user_id: permission.user_id().to_string(),
            username: None,
            job_title: permission.job_title().as_str().to_owned(),
            level: permission.level().as_str(),
            restriction_type,
            restriction_id,
        }
    }
}
