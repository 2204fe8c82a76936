mod caller;
mod error;
mod handlers;
mod json;
pub mod middleware;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::db::Database;

pub use caller::{Caller, USER_ID_HEADER};
pub use error::{ApiError, ErrorBody};
pub use json::JsonBody;
pub use middleware::SecurityConfig;

/// Router with security disabled (local use and tests).
pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, SecurityConfig::disabled())
}

pub fn create_router_with_config(db: Database, config: SecurityConfig) -> Router {
    let api = Router::new()
        // Users
        .route("/users", post(handlers::register_user))
        // Engineers
        .route("/engineers", get(handlers::list_engineers))
        .route("/engineers/search", get(handlers::search_engineers))
        .route("/engineers/capacity", get(handlers::list_capacity))
        .route(
            "/engineers/{id}",
            get(handlers::get_engineer).put(handlers::update_engineer),
        )
        .route("/engineers/{id}/capacity", get(handlers::get_engineer_capacity))
        .route(
            "/engineers/{id}/availability",
            get(handlers::get_engineer_availability),
        )
        .route(
            "/engineers/{id}/assignments",
            get(handlers::list_engineer_assignments),
        )
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/projects/{id}/assignments",
            get(handlers::list_project_assignments),
        )
        // Assignments
        .route(
            "/assignments",
            get(handlers::list_assignments).post(handlers::create_assignment),
        )
        .route(
            "/assignments/{id}",
            get(handlers::get_assignment)
                .put(handlers::update_assignment)
                .delete(handlers::delete_assignment),
        )
        // Health
        .route("/health", get(handlers::health));

    let mut router = Router::new().nest("/api/v1", api).with_state(db);

    if let Some(limiter) = config.rate_limiter.clone() {
        router = router.layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));
    }

    let cors = config.cors_layer();
    router
        .layer(from_fn_with_state(config, middleware::auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
