//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify the account role.
//! Roles here are flat, not hierarchical: an admin is not implicitly a
//! recycler, because recycler operations act on the centers the account
//! manages.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin only".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for recycler-only endpoints (center claiming, report status updates).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireRecycler(user): RequireRecycler) { ... }
/// ```
pub struct RequireRecycler(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireRecycler
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_recycler() {
            return Err(AppError::Forbidden("Recycler only".to_string()));
        }

        Ok(RequireRecycler(user.clone()))
    }
}
