use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{CreateReportDto, ReportResponseDto};
use crate::features::reports::services::{SubmissionService, UploadedImage};
use crate::shared::types::{ApiResponse, Meta};

/// Submit an e-waste report
///
/// Accepts multipart/form-data with a `file` field and an optional
/// `recycler_id` field naming the center to hand the item to. The upload is
/// stored, validated, verified for e-waste content, and categorized; points
/// and CO2 savings are credited in the same transaction as the report.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "reports",
    security(("bearer_auth" = [])),
    request_body(
        content = CreateReportDto,
        content_type = "multipart/form-data",
        description = "E-waste photo plus an optional target center id",
    ),
    responses(
        (status = 201, description = "Report accepted and rewards credited", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid image or no e-waste detected"),
        (status = 401, description = "Not authenticated"),
        (status = 502, description = "Verification service unavailable")
    )
)]
pub async fn create_report(
    State(service): State<Arc<SubmissionService>>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let mut file: Option<UploadedImage> = None;
    let mut recycler_id: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file = Some(UploadedImage {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            "recycler_id" => {
                let text = field.text().await.map_err(|e| {
                    debug!("Failed to read recycler_id field: {}", e);
                    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
                })?;

                let text = text.trim();
                if !text.is_empty() {
                    recycler_id = Some(text.parse::<i64>().map_err(|_| {
                        AppError::BadRequest(format!("Invalid recycler_id: {}", text))
                    })?);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let image = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let (report, center) = service.submit(user.id, image, recycler_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(ReportResponseDto::from((report, center))),
            None,
            None,
        )),
    ))
}

/// List the authenticated user's reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports/history",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The user's reports, newest first", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn history(
    State(service): State<Arc<SubmissionService>>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.history(user.id).await?;
    let total = reports.len() as i64;

    let data: Vec<ReportResponseDto> = reports.into_iter().map(ReportResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

// ==================== report handler tests ====================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use sqlx::SqlitePool;

    use crate::core::config::StorageConfig;
    use crate::core::error::Result;
    use crate::features::ml::{ClassifierService, EwasteVerifier, Verdict};
    use crate::features::reports::routes;
    use crate::features::reports::services::{ReportService, SubmissionService};
    use crate::features::users::models::UserRole;
    use crate::modules::storage::UploadStore;
    use crate::shared::test_helpers::{
        auth_user, create_test_user, sample_png_bytes, setup_test_db, with_auth,
    };

    struct AlwaysEwaste;

    #[async_trait::async_trait]
    impl EwasteVerifier for AlwaysEwaste {
        async fn verify(&self, _image_bytes: &[u8], _mime_type: &str) -> Result<Verdict> {
            Ok(Verdict {
                is_ewaste: true,
                reason: "Electronics visible.".to_string(),
            })
        }
    }

    async fn test_server(pool: &SqlitePool, dir: &tempfile::TempDir) -> TestServer {
        let store = UploadStore::new(&StorageConfig {
            upload_dir: dir.path().join("uploads"),
        })
        .await
        .unwrap();

        let service = Arc::new(SubmissionService::new(
            ReportService::new(pool.clone()),
            Arc::new(store),
            Arc::new(AlwaysEwaste),
            ClassifierService::new(),
            pool.clone(),
        ));

        let user = create_test_user(pool, "uploader@example.com", UserRole::User).await;
        TestServer::new(with_auth(routes::routes(service), auth_user(&user))).unwrap()
    }

    fn photo_form(filename: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(sample_png_bytes())
                .file_name(filename)
                .mime_type("image/png"),
        )
    }

    #[tokio::test]
    async fn test_create_report_returns_created() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&pool, &dir).await;

        let response = server.post("/api/reports").multipart(photo_form("phone1.jpg")).await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["category"], "Circuit Board");
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["points_awarded"], 17);
        assert!(body["data"]["image_url"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/"));
    }

    #[tokio::test]
    async fn test_create_report_without_file_is_rejected() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&pool, &dir).await;

        let form = MultipartForm::new().add_text("recycler_id", "1");
        let response = server.post("/api/reports").multipart(form).await;
        response.assert_status_bad_request();

        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "File is required");
    }

    #[tokio::test]
    async fn test_create_report_rejects_malformed_recycler_id() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&pool, &dir).await;

        let form = photo_form("phone1.jpg").add_text("recycler_id", "first");
        let response = server.post("/api/reports").multipart(form).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_history_lists_own_reports() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&pool, &dir).await;

        server
            .post("/api/reports")
            .multipart(photo_form("phone1.jpg"))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/reports")
            .multipart(photo_form("router.png"))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/api/reports/history").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"][0]["category"], "Battery");
        assert_eq!(body["data"][1]["category"], "Circuit Board");
    }
}
