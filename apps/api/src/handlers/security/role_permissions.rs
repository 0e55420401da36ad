use super::*;

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<GrantListParams>,
) -> ApiResult<Json<Vec<RolePermissionResponse>>> {
    let permissions = state
        .grant_admin_service
        .list_role_permissions(&actor, params.into())
        .await?
        .into_iter()
        .map(RolePermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_role_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateRolePermissionRequest>,
) -> ApiResult<(StatusCode, Json<RolePermissionResponse>)> {
    let permission = state
        .grant_admin_service
        .create_role_permission(&actor, payload.into_input()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RolePermissionResponse::from(permission)),
    ))
}

pub async fn delete_role_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(permission_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .grant_admin_service
        .delete_role_permission(&actor, RolePermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
