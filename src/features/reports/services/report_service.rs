use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report};
use crate::shared::constants::POINTS_PER_LEVEL;

const REPORT_COLUMNS: &str = "id, user_id, image_path, category, confidence, suggestion, \
                              recycler_id, status, co2_saved, points_awarded, created_at, \
                              recycled_at";

/// Service for report persistence and the user-side reward aggregates
pub struct ReportService {
    pool: SqlitePool,
}

impl ReportService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a report and apply its rewards to the owning user in one
    /// transaction: points, CO2 total, last-active timestamp, and the level
    /// (which only ever moves up). The arithmetic happens in SQL so
    /// concurrent submissions for the same user cannot lose updates.
    pub async fn create_with_rewards(&self, new_report: CreateReport) -> Result<Report> {
        let mut tx = self.pool.begin().await?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports
                (user_id, image_path, category, confidence, suggestion,
                 recycler_id, status, co2_saved, points_awarded, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(new_report.user_id)
        .bind(&new_report.image_path)
        .bind(&new_report.category)
        .bind(new_report.confidence)
        .bind(&new_report.suggestion)
        .bind(new_report.recycler_id)
        .bind(new_report.status)
        .bind(new_report.co2_saved)
        .bind(new_report.points_awarded)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(&format!(
            r#"
            UPDATE users
            SET points = points + ?,
                total_co2_saved = total_co2_saved + ?,
                level = MAX(level, (points + ?) / {POINTS_PER_LEVEL} + 1),
                last_active = ?
            WHERE id = ?
            "#
        ))
        .bind(new_report.points_awarded)
        .bind(new_report.co2_saved)
        .bind(new_report.points_awarded)
        .bind(Utc::now())
        .bind(new_report.user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to apply rewards to user: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!(
            "Report {} created for user {} ({} points, {} kg CO2)",
            report.id,
            report.user_id,
            report.points_awarded,
            report.co2_saved
        );

        Ok(report)
    }

    /// A user's reports, newest first
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }
}

// ==================== report service tests ====================
