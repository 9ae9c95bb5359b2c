use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::users::dtos::UserStatsDto;
use crate::features::users::models::User;

/// Service for user account operations
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, points, level,
                   total_co2_saved, total_items_recycled, created_at, last_active
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Contribution stats for the dashboard: report counts plus the
    /// reward totals maintained by the submission pipeline.
    pub async fn stats(&self, user_id: i64) -> Result<UserStatsDto> {
        let user = self.get_by_id(user_id).await?;

        let total_reports: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let recycled_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE user_id = ? AND status = 'recycled'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStatsDto {
            total_reports,
            recycled_count,
            co2_saved_kg: (user.total_co2_saved * 10.0).round() / 10.0,
            points: user.points,
            level: user.level,
        })
    }
}

// ==================== user service tests ====================
