use super::*;

pub async fn list_grants_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<GrantListParams>,
) -> ApiResult<Json<Vec<GrantResponse>>> {
    let grants = state
        .grant_admin_service
        .list_grants(&actor, params.into())
        .await?
        .into_iter()
        .map(GrantResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn create_grant_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateGrantRequest>,
) -> ApiResult<(StatusCode, Json<GrantResponse>)> {
    let grant = state
        .grant_admin_service
        .create_grant(&actor, payload.into_input()?)
        .await?;

    Ok((StatusCode::CREATED, Json(GrantResponse::from(grant))))
}

pub async fn delete_grant_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(grant_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .grant_admin_service
        .delete_grant(&actor, GrantId::from_uuid(grant_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
