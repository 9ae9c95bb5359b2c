use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::users::handlers::{self, UserState};
use crate::features::users::services::UserService;

/// Create routes for the users feature (all require authentication)
pub fn routes(user_service: Arc<UserService>) -> Router {
    let state = UserState { user_service };

    Router::new()
        .route("/api/users/me", get(handlers::get_me))
        .route("/api/users/stats", get(handlers::get_stats))
        .with_state(state)
}
