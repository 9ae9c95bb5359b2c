use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::recyclers::models::RecyclerCenter;

const CENTER_COLUMNS: &str = "id, name, latitude, longitude, address, manager_id, approved, \
                              total_recycled, total_co2_saved, performance_score, created_at";

/// Service for admin operations: center approval and account oversight
pub struct AdminService {
    pool: SqlitePool,
}

impl AdminService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Approve a center so recyclers can claim it. Approving an already
    /// approved center is a no-op.
    pub async fn approve_center(&self, center_id: i64) -> Result<RecyclerCenter> {
        let center = sqlx::query_as::<_, RecyclerCenter>(&format!(
            r#"
            UPDATE recycler_centers
            SET approved = 1
            WHERE id = ?
            RETURNING {CENTER_COLUMNS}
            "#
        ))
        .bind(center_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to approve center: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Center not found".to_string()))?;

        tracing::info!("Center {} ({}) approved", center.id, center.name);
        Ok(center)
    }

    /// Email addresses of every registered account
    pub async fn list_user_emails(&self) -> Result<Vec<String>> {
        let emails = sqlx::query_scalar("SELECT email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(emails)
    }
}

// ==================== admin service tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{create_test_center, create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_approve_center_flips_flag() {
        let pool = setup_test_db().await;
        let center = create_test_center(&pool, "Awaiting Approval", None).await;
        sqlx::query("UPDATE recycler_centers SET approved = 0 WHERE id = ?")
            .bind(center.id)
            .execute(&pool)
            .await
            .unwrap();

        let service = AdminService::new(pool);
        let approved = service.approve_center(center.id).await.unwrap();
        assert!(approved.approved);

        // Approving again changes nothing
        let again = service.approve_center(center.id).await.unwrap();
        assert!(again.approved);
    }

    #[tokio::test]
    async fn test_approve_missing_center() {
        let pool = setup_test_db().await;
        let service = AdminService::new(pool);

        let err = service.approve_center(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_user_emails() {
        let pool = setup_test_db().await;
        create_test_user(&pool, "a@example.com", UserRole::User).await;
        create_test_user(&pool, "b@example.com", UserRole::Recycler).await;

        let service = AdminService::new(pool);
        let emails = service.list_user_emails().await.unwrap();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }
}
