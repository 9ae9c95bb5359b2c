use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::SubmissionService;

/// Maximum body size for report uploads (21MB to account for multipart overhead)
const UPLOAD_BODY_LIMIT: usize = 21 * 1024 * 1024;

/// Create routes for the reports feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<SubmissionService>) -> Router {
    Router::new()
        .route("/api/reports", post(handlers::create_report))
        .route("/api/reports/history", get(handlers::history))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(service)
}
