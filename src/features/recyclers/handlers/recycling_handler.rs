use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireRecycler;
use crate::features::recyclers::dtos::UpdateReportStatusDto;
use crate::features::recyclers::services::RecyclingService;
use crate::features::reports::dtos::ReportResponseDto;
use crate::shared::types::{ApiResponse, Meta};

/// List reports assigned to the caller's centers
///
/// Recycler only. Covers every center the caller manages, newest first.
#[utoipa::path(
    get,
    path = "/api/recyclers/assigned",
    tag = "recyclers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reports assigned to managed centers", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 403, description = "Caller is not a recycler")
    )
)]
pub async fn assigned_reports(
    RequireRecycler(user): RequireRecycler,
    State(service): State<Arc<RecyclingService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.assigned_reports(user.id).await?;
    let total = reports.len() as i64;

    let data: Vec<ReportResponseDto> =
        reports.into_iter().map(ReportResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Advance an assigned report's status
///
/// Recycler only; the report must belong to a center the caller manages.
/// Accepts `received` and `recycled`. Transitions only move forward, and
/// marking a report recycled credits the owner and center aggregates
/// exactly once.
#[utoipa::path(
    post,
    path = "/api/recyclers/assigned/{report_id}/status",
    tag = "recyclers",
    security(("bearer_auth" = [])),
    params(
        ("report_id" = i64, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Updated report", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Not assigned to the caller's centers"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already recycled")
    )
)]
pub async fn update_report_status(
    RequireRecycler(user): RequireRecycler,
    State(service): State<Arc<RecyclingService>>,
    Path(report_id): Path<i64>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let (report, center) = service.update_status(user.id, report_id, dto.status).await?;

    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::from((report, center))),
        None,
        None,
    )))
}

// ==================== recycling handler tests ====================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::SqlitePool;

    use crate::features::recyclers::routes;
    use crate::features::recyclers::services::{CenterService, RecyclingService};
    use crate::features::reports::models::ReportStatus;
    use crate::features::users::models::{User, UserRole};
    use crate::shared::test_helpers::{
        auth_user, create_test_center, create_test_report, create_test_user, setup_test_db,
        with_auth,
    };

    fn server_as(pool: &SqlitePool, user: &User) -> TestServer {
        let app = routes::routes(
            Arc::new(CenterService::new(pool.clone())),
            Arc::new(RecyclingService::new(pool.clone())),
        );
        TestServer::new(with_auth(app, auth_user(user))).unwrap()
    }

    #[tokio::test]
    async fn test_assigned_reports_embed_center() {
        let pool = setup_test_db().await;
        let owner = create_test_user(&pool, "owner@example.com", UserRole::User).await;
        let recycler = create_test_user(&pool, "recycler@example.com", UserRole::Recycler).await;
        let center = create_test_center(&pool, "My Center", Some(recycler.id)).await;
        create_test_report(&pool, owner.id, Some(center.id), ReportStatus::Assigned, 1.8).await;

        let server = server_as(&pool, &recycler);
        let response = server.get("/api/recyclers/assigned").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["recycler"]["name"], "My Center");
        assert_eq!(body["data"][0]["status"], "assigned");
        // Only the report and its center are exposed, never the owner
        assert!(body["data"][0].get("user_id").is_none());
    }

    #[tokio::test]
    async fn test_status_update_returns_refreshed_report() {
        let pool = setup_test_db().await;
        let owner = create_test_user(&pool, "owner@example.com", UserRole::User).await;
        let recycler = create_test_user(&pool, "recycler@example.com", UserRole::Recycler).await;
        let center = create_test_center(&pool, "My Center", Some(recycler.id)).await;
        let report =
            create_test_report(&pool, owner.id, Some(center.id), ReportStatus::Assigned, 1.8)
                .await;

        let server = server_as(&pool, &recycler);
        let response = server
            .post(&format!("/api/recyclers/assigned/{}/status", report))
            .json(&json!({"status": "recycled"}))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["status"], "recycled");
        assert_eq!(body["data"]["recycler"]["total_recycled"], 1);
    }

    #[tokio::test]
    async fn test_status_update_rejects_unknown_status_string() {
        let pool = setup_test_db().await;
        let owner = create_test_user(&pool, "owner@example.com", UserRole::User).await;
        let recycler = create_test_user(&pool, "recycler@example.com", UserRole::Recycler).await;
        let center = create_test_center(&pool, "My Center", Some(recycler.id)).await;
        let report =
            create_test_report(&pool, owner.id, Some(center.id), ReportStatus::Assigned, 1.8)
                .await;

        let server = server_as(&pool, &recycler);
        let response = server
            .post(&format!("/api/recyclers/assigned/{}/status", report))
            .json(&json!({"status": "burned"}))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_status_update_regression_conflicts() {
        let pool = setup_test_db().await;
        let owner = create_test_user(&pool, "owner@example.com", UserRole::User).await;
        let recycler = create_test_user(&pool, "recycler@example.com", UserRole::Recycler).await;
        let center = create_test_center(&pool, "My Center", Some(recycler.id)).await;
        let report =
            create_test_report(&pool, owner.id, Some(center.id), ReportStatus::Recycled, 1.8)
                .await;

        let server = server_as(&pool, &recycler);
        let response = server
            .post(&format!("/api/recyclers/assigned/{}/status", report))
            .json(&json!({"status": "received"}))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_status_update_requires_recycler() {
        let pool = setup_test_db().await;
        let user = create_test_user(&pool, "user@example.com", UserRole::User).await;

        let server = server_as(&pool, &user);
        let response = server
            .post("/api/recyclers/assigned/1/status")
            .json(&json!({"status": "recycled"}))
            .await;
        response.assert_status_forbidden();
    }
}
