use axum::Json;
use axum::extract::{Extension, State};

use frequencia_core::Actor;
use frequencia_domain::AccessLevel;

use crate::dto::{GrantResponse, ScopeResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn scope_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<ScopeResponse>> {
    let scope = state.scope_service.resolve_scope(&actor).await?;

    Ok(Json(ScopeResponse::new(AccessLevel::Read, &scope)))
}

pub async fn manage_scope_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<ScopeResponse>> {
    let scope = state
        .scope_service
        .resolve_scope_at(&actor, AccessLevel::Manage)
        .await?;

    Ok(Json(ScopeResponse::new(AccessLevel::Manage, &scope)))
}

pub async fn own_grants_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<GrantResponse>>> {
    let grants = state
        .grant_admin_service
        .list_own_grants(&actor)
        .await?
        .into_iter()
        .map(GrantResponse::from)
        .collect();

    Ok(Json(grants))
}
