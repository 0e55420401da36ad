use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use frequencia_core::{Actor, AppError};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::dto::ActorResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "actor";
pub const SESSION_CREATED_AT_KEY: &str = "created_at";

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub username: String,
    pub token: String,
}

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<Json<ActorResponse>> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let actor = state
        .actor_repository
        .find_actor_by_username(payload.username.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown or inactive user".to_owned()))?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &actor)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session actor: {error}")))?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(user_id = %actor.user_id(), username = actor.username(), "session bootstrapped");

    Ok(Json(ActorResponse::from(&actor)))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(session: Session) -> ApiResult<Json<ActorResponse>> {
    let actor = session_actor(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(ActorResponse::from(&actor)))
}

pub async fn session_actor(session: &Session) -> Result<Option<Actor>, AppError> {
    session
        .get::<Actor>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session actor: {error}")))
}
