use frequencia_core::{AppError, AppResult};
use frequencia_domain::{
    AccessTarget, AgencyId, DepartmentId, EmployeeId, Feature, MunicipalityId, SectorId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incoming payload for feature checks.
#[derive(Debug, Deserialize)]
pub struct AccessCheckRequest {
    pub feature: String,
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
}

impl AccessCheckRequest {
    /// Parses the feature and the optional target.
    pub fn into_check(self) -> AppResult<(Feature, Option<AccessTarget>)> {
        let feature = Feature::parse_transport(self.feature.as_str())?;
        let target = match (self.target_type.as_deref(), self.target_id) {
            (None, None) => None,
            (Some(target_type), Some(target_id)) => Some(access_target(target_type, target_id)?),
            _ => {
                return Err(AppError::Validation(
                    "target_type and target_id must be provided together".to_owned(),
                ));
            }
        };

        Ok((feature, target))
    }
}

fn access_target(target_type: &str, id: Uuid) -> AppResult<AccessTarget> {
    match target_type.trim().to_lowercase().as_str() {
        "employee" => Ok(AccessTarget::Employee(EmployeeId::from_uuid(id))),
        "sector" => Ok(AccessTarget::Sector(SectorId::from_uuid(id))),
        "department" => Ok(AccessTarget::Department(DepartmentId::from_uuid(id))),
        "agency" => Ok(AccessTarget::Agency(AgencyId::from_uuid(id))),
        "municipality" => Ok(AccessTarget::Municipality(MunicipalityId::from_uuid(id))),
        other => Err(AppError::Validation(format!(
            "unknown target type '{other}'"
        ))),
    }
}

/// Feature check outcome.
#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub feature: &'static str,
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Read access to a single employee.
#[derive(Debug, Serialize)]
pub struct EmployeeAccessResponse {
    pub employee_id: String,
    pub allowed: bool,
}
