use axum::Json;
use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use frequencia_core::Actor;
use frequencia_domain::EmployeeId;

use crate::dto::{AccessCheckRequest, AccessCheckResponse, EmployeeAccessResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn access_check_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<AccessCheckRequest>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let (feature, target) = payload.into_check()?;
    let decision = state
        .access_policy_service
        .evaluate(&actor, feature, target)
        .await?;

    Ok(Json(AccessCheckResponse {
        feature: feature.as_str(),
        allowed: decision.is_allowed(),
        reason: decision.reason().map(ToOwned::to_owned),
    }))
}

pub async fn employee_access_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<Json<EmployeeAccessResponse>> {
    let allowed = state
        .scope_service
        .can_access_employee(&actor, EmployeeId::from_uuid(employee_id))
        .await?;

    Ok(Json(EmployeeAccessResponse {
        employee_id: employee_id.to_string(),
        allowed,
    }))
}
