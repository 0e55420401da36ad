use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use frequencia_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/scope", get(handlers::scope::scope_handler))
        .route(
            "/api/scope/manage",
            get(handlers::scope::manage_scope_handler),
        )
        .route(
            "/api/scope/grants",
            get(handlers::scope::own_grants_handler),
        )
        .route(
            "/api/access/check",
            post(handlers::access::access_check_handler),
        )
        .route(
            "/api/employees/{employee_id}/access",
            get(handlers::access::employee_access_handler),
        )
        .route(
            "/api/sectors",
            get(handlers::records::list_sectors_handler),
        )
        .route(
            "/api/employees",
            get(handlers::records::list_employees_handler),
        )
        .route(
            "/api/timesheets",
            get(handlers::records::list_timesheets_handler),
        )
        .route(
            "/api/work-schedules",
            get(handlers::records::list_work_schedules_handler),
        )
        .route(
            "/api/security/grants",
            get(handlers::security::list_grants_handler)
                .post(handlers::security::create_grant_handler),
        )
        .route(
            "/api/security/grants/{grant_id}",
            delete(handlers::security::delete_grant_handler),
        )
        .route(
            "/api/security/role-permissions",
            get(handlers::security::list_role_permissions_handler)
                .post(handlers::security::create_role_permission_handler),
        )
        .route(
            "/api/security/role-permissions/{permission_id}",
            delete(handlers::security::delete_role_permission_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
