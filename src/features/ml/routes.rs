use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::ml::handlers;
use crate::features::ml::services::ClassifierService;

/// Create routes for the ml feature
///
/// Note: prediction is public; it never touches user state and the frontend
/// calls it before the user decides to submit a report.
pub fn public_routes(classifier: Arc<ClassifierService>) -> Router {
    Router::new()
        .route("/api/ml/predict", post(handlers::predict))
        .with_state(classifier)
}
