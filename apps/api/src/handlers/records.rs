use axum::Json;
use axum::extract::{Extension, State};

use frequencia_core::Actor;

use crate::dto::{EmployeeResponse, SectorResponse, TimesheetResponse, WorkScheduleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_sectors_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<SectorResponse>>> {
    let sectors = state
        .scope_service
        .filter_sectors(&actor)
        .await?
        .into_iter()
        .map(SectorResponse::from)
        .collect();

    Ok(Json(sectors))
}

pub async fn list_employees_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<EmployeeResponse>>> {
    let employees = state
        .scope_service
        .filter_employees(&actor)
        .await?
        .into_iter()
        .map(EmployeeResponse::from)
        .collect();

    Ok(Json(employees))
}

pub async fn list_timesheets_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<TimesheetResponse>>> {
    let timesheets = state
        .scope_service
        .filter_timesheets(&actor)
        .await?
        .into_iter()
        .map(TimesheetResponse::from)
        .collect();

    Ok(Json(timesheets))
}

pub async fn list_work_schedules_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<WorkScheduleResponse>>> {
    let work_schedules = state
        .scope_service
        .filter_work_schedules(&actor)
        .await?
        .into_iter()
        .map(WorkScheduleResponse::from)
        .collect();

    Ok(Json(work_schedules))
}
