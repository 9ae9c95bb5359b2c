use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{UserResponseDto, UserStatsDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// State for user handlers
#[derive(Clone)]
pub struct UserState {
    pub user_service: Arc<UserService>,
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(state): State<UserState>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = state.user_service.get_by_id(user.id).await?;
    Ok(Json(ApiResponse::success(Some(profile.into()), None, None)))
}

/// Get the authenticated user's contribution stats
#[utoipa::path(
    get,
    path = "/api/users/stats",
    responses(
        (status = 200, description = "Current user stats", body = ApiResponse<UserStatsDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_stats(
    user: AuthenticatedUser,
    State(state): State<UserState>,
) -> Result<Json<ApiResponse<UserStatsDto>>> {
    let stats = state.user_service.stats(user.id).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
