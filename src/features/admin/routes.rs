use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create routes for the admin feature
///
/// Note: This feature requires authentication with the admin role
pub fn routes(service: Arc<AdminService>) -> Router {
    Router::new()
        .route(
            "/api/admin/centers/{id}/approve",
            post(handlers::approve_center),
        )
        .route("/api/admin/users", get(handlers::list_users))
        .with_state(service)
}
