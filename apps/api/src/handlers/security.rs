use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use frequencia_core::Actor;
use frequencia_domain::{GrantId, RolePermissionId};

use crate::dto::{
    CreateGrantRequest, CreateRolePermissionRequest, GrantListParams, GrantResponse,
    RolePermissionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod grants;
mod role_permissions;

pub use grants::{create_grant_handler, delete_grant_handler, list_grants_handler};
pub use role_permissions::{
    create_role_permission_handler, delete_role_permission_handler, list_role_permissions_handler,
};
