use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::users::models::{User, UserRole};

/// Public view of a user account (never exposes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub points: i64,
    pub level: i64,
    pub total_co2_saved: f64,
    pub total_items_recycled: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            points: u.points,
            level: u.level,
            total_co2_saved: u.total_co2_saved,
            total_items_recycled: u.total_items_recycled,
            created_at: u.created_at,
        }
    }
}

/// Contribution stats for the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserStatsDto {
    pub total_reports: i64,
    pub recycled_count: i64,
    pub co2_saved_kg: f64,
    pub points: i64,
    pub level: i64,
}
