use frequencia_core::Actor;
use serde::Serialize;

mod access;
mod records;
mod scope;
mod security;

pub use access::{AccessCheckRequest, AccessCheckResponse, EmployeeAccessResponse};
pub use records::{EmployeeResponse, SectorResponse, TimesheetResponse, WorkScheduleResponse};
pub use scope::ScopeResponse;
pub use security::{
    CreateGrantRequest, CreateRolePermissionRequest, GrantListParams, GrantResponse,
    RolePermissionResponse,
};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Authenticated account as seen by the frontend.
#[derive(Debug, Serialize)]
pub struct ActorResponse {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub is_superuser: bool,
    pub is_staff: bool,
}

impl From<&Actor> for ActorResponse {
    fn from(actor: &Actor) -> Self {
        Self {
            user_id: actor.user_id().to_string(),
            username: actor.username().to_owned(),
            display_name: actor.display_name().to_owned(),
            is_superuser: actor.is_superuser(),
            is_staff: actor.is_staff(),
        }
    }
}
