use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::analytics::dtos::AnalyticsOverviewDto;
use crate::features::analytics::services::AnalyticsService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::ApiResponse;

/// Platform-wide analytics rollup
#[utoipa::path(
    get,
    path = "/api/analytics/overview",
    tag = "analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Aggregated platform metrics", body = ApiResponse<AnalyticsOverviewDto>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn analytics_overview(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AnalyticsService>>,
) -> Result<Json<ApiResponse<AnalyticsOverviewDto>>> {
    let overview = service.overview().await?;
    Ok(Json(ApiResponse::success(Some(overview), None, None)))
}

// ==================== analytics handler tests ====================
