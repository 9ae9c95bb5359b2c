use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::recyclers::models::RecyclerCenter;
use crate::features::reports::models::{Report, ReportStatus};
use crate::shared::constants::{PERFORMANCE_SCORE_MAX, PERFORMANCE_SCORE_STEP};

const CENTER_COLUMNS: &str = "id, name, latitude, longitude, address, manager_id, approved, \
                              total_recycled, total_co2_saved, performance_score, created_at";

const REPORT_COLUMNS: &str = "id, user_id, image_path, category, confidence, suggestion, \
                              recycler_id, status, co2_saved, points_awarded, created_at, \
                              recycled_at";

/// Service for the recycler-side work queue: listing reports assigned to
/// managed centers and advancing their recycling status.
pub struct RecyclingService {
    pool: SqlitePool,
}

impl RecyclingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reports assigned to any center the manager runs, newest first
    pub async fn assigned_reports(
        &self,
        manager_id: i64,
    ) -> Result<Vec<(Report, Option<RecyclerCenter>)>> {
        let centers = sqlx::query_as::<_, RecyclerCenter>(&format!(
            "SELECT {CENTER_COLUMNS} FROM recycler_centers WHERE manager_id = ?"
        ))
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        if centers.is_empty() {
            return Ok(Vec::new());
        }

        let reports = sqlx::query_as::<_, Report>(
            "SELECT r.id, r.user_id, r.image_path, r.category, r.confidence, r.suggestion, \
             r.recycler_id, r.status, r.co2_saved, r.points_awarded, r.created_at, r.recycled_at \
             FROM reports r \
             JOIN recycler_centers c ON c.id = r.recycler_id \
             WHERE c.manager_id = ? \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        let lookup: HashMap<i64, RecyclerCenter> =
            centers.into_iter().map(|c| (c.id, c)).collect();

        Ok(reports
            .into_iter()
            .map(|report| {
                let center = report.recycler_id.and_then(|id| lookup.get(&id).cloned());
                (report, center)
            })
            .collect())
    }

    /// Advance an assigned report's status. Transitions only ever move
    /// forward; marking a report recycled applies the user and center
    /// aggregates exactly once no matter how often it is replayed.
    pub async fn update_status(
        &self,
        manager_id: i64,
        report_id: i64,
        target: ReportStatus,
    ) -> Result<(Report, Option<RecyclerCenter>)> {
        let report = self.get_report(report_id).await?;

        let managed: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM recycler_centers WHERE manager_id = ?")
                .bind(manager_id)
                .fetch_all(&self.pool)
                .await?;

        let center_id = match report.recycler_id {
            Some(id) if managed.contains(&id) => id,
            _ => {
                return Err(AppError::Forbidden(
                    "Not assigned to your center".to_string(),
                ))
            }
        };

        match target {
            ReportStatus::Pending | ReportStatus::Assigned => {
                return Err(AppError::BadRequest("Invalid status".to_string()));
            }
            ReportStatus::Received => self.mark_received(&report).await?,
            ReportStatus::Recycled => self.mark_recycled(&report, center_id).await?,
        }

        let refreshed = self.get_report(report_id).await?;
        let center = self.get_center(center_id).await?;
        Ok((refreshed, center))
    }

    async fn mark_received(&self, report: &Report) -> Result<()> {
        match report.status {
            ReportStatus::Recycled => {
                Err(AppError::Conflict("Report already recycled".to_string()))
            }
            ReportStatus::Received => Ok(()),
            _ => {
                // The status guard keeps a concurrent recycle from being
                // overwritten back to received.
                sqlx::query("UPDATE reports SET status = ? WHERE id = ? AND status <> ?")
                    .bind(ReportStatus::Received)
                    .bind(report.id)
                    .bind(ReportStatus::Recycled)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to mark report received: {:?}", e);
                        AppError::Database(e)
                    })?;
                Ok(())
            }
        }
    }

    /// Flip the report to recycled and apply the aggregates in one
    /// transaction. The `status <> 'recycled'` guard makes the flip the
    /// single decision point, so replays and races apply nothing twice.
    async fn mark_recycled(&self, report: &Report, center_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            "UPDATE reports SET status = ?, recycled_at = ? WHERE id = ? AND status <> ?",
        )
        .bind(ReportStatus::Recycled)
        .bind(Utc::now())
        .bind(report.id)
        .bind(ReportStatus::Recycled)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark report recycled: {:?}", e);
            AppError::Database(e)
        })?
        .rows_affected();

        if flipped > 0 {
            sqlx::query(
                "UPDATE users SET total_items_recycled = total_items_recycled + 1 WHERE id = ?",
            )
            .bind(report.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update user recycle count: {:?}", e);
                AppError::Database(e)
            })?;

            sqlx::query(
                "UPDATE recycler_centers \
                 SET total_recycled = total_recycled + 1, \
                     total_co2_saved = total_co2_saved + ?, \
                     performance_score = MIN(?, performance_score + ?) \
                 WHERE id = ?",
            )
            .bind(report.co2_saved)
            .bind(PERFORMANCE_SCORE_MAX)
            .bind(PERFORMANCE_SCORE_STEP)
            .bind(center_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update center stats: {:?}", e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await?;

        if flipped > 0 {
            tracing::info!("Report {} recycled at center {}", report.id, center_id);
        }
        Ok(())
    }

    async fn get_report(&self, id: i64) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    async fn get_center(&self, id: i64) -> Result<Option<RecyclerCenter>> {
        let center = sqlx::query_as::<_, RecyclerCenter>(&format!(
            "SELECT {CENTER_COLUMNS} FROM recycler_centers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(center)
    }
}

// ==================== recycling service tests ====================
