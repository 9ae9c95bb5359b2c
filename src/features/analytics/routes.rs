use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::analytics::handlers;
use crate::features::analytics::services::AnalyticsService;

/// Create routes for the analytics feature
///
/// Note: This feature requires authentication with the admin role
pub fn routes(service: Arc<AnalyticsService>) -> Router {
    Router::new()
        .route(
            "/api/analytics/overview",
            get(handlers::analytics_overview),
        )
        .with_state(service)
}
