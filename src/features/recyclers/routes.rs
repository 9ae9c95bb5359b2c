use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::recyclers::handlers;
use crate::features::recyclers::services::{CenterService, RecyclingService};

/// Public recycler routes: the center listing doubles as the map data
/// source for unauthenticated visitors.
pub fn public_routes(center_service: Arc<CenterService>) -> Router {
    Router::new()
        .route("/api/recyclers/centers", get(handlers::list_centers))
        .with_state(center_service)
}

/// Create routes for the recyclers feature
///
/// Note: This feature requires authentication
pub fn routes(
    center_service: Arc<CenterService>,
    recycling_service: Arc<RecyclingService>,
) -> Router {
    let center_routes = Router::new()
        .route("/api/recyclers/centers", post(handlers::create_center))
        .route(
            "/api/recyclers/centers/{id}/claim",
            post(handlers::claim_center),
        )
        .with_state(center_service);

    let recycling_routes = Router::new()
        .route("/api/recyclers/assigned", get(handlers::assigned_reports))
        .route(
            "/api/recyclers/assigned/{report_id}/status",
            post(handlers::update_report_status),
        )
        .with_state(recycling_service);

    center_routes.merge(recycling_routes)
}
