use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireRecycler};
use crate::features::recyclers::dtos::{CenterResponseDto, CreateCenterDto};
use crate::features::recyclers::services::CenterService;
use crate::shared::types::{ApiResponse, Meta};

/// List recycling centers
///
/// Public endpoint. An empty table is seeded with a small demo set so the
/// map view always has centers to show.
#[utoipa::path(
    get,
    path = "/api/recyclers/centers",
    tag = "recyclers",
    responses(
        (status = 200, description = "All recycling centers", body = ApiResponse<Vec<CenterResponseDto>>)
    )
)]
pub async fn list_centers(
    State(service): State<Arc<CenterService>>,
) -> Result<Json<ApiResponse<Vec<CenterResponseDto>>>> {
    let centers = service.list_all().await?;
    let total = centers.len() as i64;

    let data: Vec<CenterResponseDto> =
        centers.into_iter().map(CenterResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Register a recycling center
///
/// Admin only. The center starts unapproved and must be approved before a
/// recycler can claim it.
#[utoipa::path(
    post,
    path = "/api/recyclers/centers",
    tag = "recyclers",
    security(("bearer_auth" = [])),
    request_body = CreateCenterDto,
    responses(
        (status = 201, description = "Center registered", body = ApiResponse<CenterResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_center(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CenterService>>,
    AppJson(dto): AppJson<CreateCenterDto>,
) -> Result<(StatusCode, Json<ApiResponse<CenterResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let center = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(center.into()), None, None)),
    ))
}

/// Claim a recycling center
///
/// Recycler only. Claiming a center the caller already manages succeeds
/// without changes; a center managed by someone else is a conflict.
#[utoipa::path(
    post,
    path = "/api/recyclers/centers/{id}/claim",
    tag = "recyclers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Center ID")
    ),
    responses(
        (status = 200, description = "Center claimed", body = ApiResponse<CenterResponseDto>),
        (status = 400, description = "Center not yet approved"),
        (status = 403, description = "Caller is not a recycler"),
        (status = 404, description = "Center not found"),
        (status = 409, description = "Center already claimed")
    )
)]
pub async fn claim_center(
    RequireRecycler(user): RequireRecycler,
    State(service): State<Arc<CenterService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CenterResponseDto>>> {
    let center = service.claim(id, user.id).await?;
    Ok(Json(ApiResponse::success(Some(center.into()), None, None)))
}

// ==================== center handler tests ====================
