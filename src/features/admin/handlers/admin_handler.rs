use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::recyclers::dtos::CenterResponseDto;
use crate::shared::types::{ApiResponse, Meta};

/// Approve a recycling center
#[utoipa::path(
    post,
    path = "/api/admin/centers/{id}/approve",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Center ID")
    ),
    responses(
        (status = 200, description = "Center approved", body = ApiResponse<CenterResponseDto>),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Center not found")
    )
)]
pub async fn approve_center(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CenterResponseDto>>> {
    let center = service.approve_center(id).await?;
    Ok(Json(ApiResponse::success(Some(center.into()), None, None)))
}

/// List all registered email addresses
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered account emails", body = ApiResponse<Vec<String>>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let emails = service.list_user_emails().await?;
    let total = emails.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(emails),
        None,
        Some(Meta { total }),
    )))
}

// ==================== admin handler tests ====================
