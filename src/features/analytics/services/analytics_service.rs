use std::collections::BTreeMap;

use chrono::{Duration, NaiveTime, Utc};
use sqlx::SqlitePool;

use crate::core::error::Result;
use crate::features::analytics::dtos::{
    AnalyticsOverviewDto, CenterPerformanceDto, ContributorDto, TimelinePointDto,
};
use crate::features::reports::models::ReportStatus;

/// Number of trailing days covered by the impact timeline
const TIMELINE_DAYS: u64 = 7;

/// Window length for the growth-rate comparison
const GROWTH_WINDOW_DAYS: i64 = 30;

/// Service for the admin analytics rollups
pub struct AnalyticsService {
    pool: SqlitePool,
}

impl AnalyticsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self) -> Result<AnalyticsOverviewDto> {
        let by_category = self.reports_by_category().await?;
        let top_contributors = self.top_contributors().await?;
        let center_performance = self.center_performance().await?;

        let co2_saved_kg: f64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(co2_saved), 0.0) FROM reports")
                .fetch_one(&self.pool)
                .await?;

        let total_reports: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;
        let total_recycled: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE status = ?")
                .bind(ReportStatus::Recycled)
                .fetch_one(&self.pool)
                .await?;
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_centers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recycler_centers")
            .fetch_one(&self.pool)
            .await?;

        Ok(AnalyticsOverviewDto {
            by_category,
            top_contributors,
            center_performance,
            co2_saved_kg: round1(co2_saved_kg),
            total_users,
            total_centers,
            total_reports,
            total_recycled,
            growth_rate: self.growth_rate().await?,
            impact_timeline: self.impact_timeline().await?,
        })
    }

    async fn reports_by_category(&self) -> Result<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM reports GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Top five accounts by points. An account with an empty name shows
    /// its email instead.
    async fn top_contributors(&self) -> Result<Vec<ContributorDto>> {
        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT name, email, points FROM users ORDER BY points DESC, id LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, email, points)| ContributorDto {
                name: if name.is_empty() { email } else { name },
                points,
            })
            .collect())
    }

    /// Recycled-report counts per center, busiest first. Centers that have
    /// recycled nothing are omitted.
    async fn center_performance(&self) -> Result<Vec<CenterPerformanceDto>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT c.name, COUNT(r.id) AS recycled \
             FROM recycler_centers c \
             JOIN reports r ON r.recycler_id = c.id \
             WHERE r.status = ? \
             GROUP BY c.id, c.name \
             ORDER BY recycled DESC, c.name",
        )
        .bind(ReportStatus::Recycled)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, recycled)| CenterPerformanceDto { name, recycled })
            .collect())
    }

    /// Submission growth of the last 30 days against the 30 days before,
    /// as a percentage. An empty previous window reads as zero growth.
    async fn growth_rate(&self) -> Result<f64> {
        let now = Utc::now();
        let last_30 = now - Duration::days(GROWTH_WINDOW_DAYS);
        let prev_30 = last_30 - Duration::days(GROWTH_WINDOW_DAYS);

        let recent: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE created_at >= ?")
            .bind(last_30)
            .fetch_one(&self.pool)
            .await?;
        let previous: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE created_at >= ? AND created_at < ?",
        )
        .bind(prev_30)
        .bind(last_30)
        .fetch_one(&self.pool)
        .await?;

        if previous == 0 {
            return Ok(0.0);
        }
        Ok(round1((recent - previous) as f64 / previous as f64 * 100.0))
    }

    /// Report counts and CO2 per day for the trailing week, oldest first.
    /// Days are midnight-to-midnight UTC windows.
    async fn impact_timeline(&self) -> Result<Vec<TimelinePointDto>> {
        let today = Utc::now().date_naive();
        let mut timeline = Vec::with_capacity(TIMELINE_DAYS as usize);

        for offset in (0..TIMELINE_DAYS).rev() {
            let day = today - chrono::Days::new(offset);
            let start = day.and_time(NaiveTime::MIN).and_utc();
            let end = start + Duration::days(1);

            let reports: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM reports WHERE created_at >= ? AND created_at < ?",
            )
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

            let co2: f64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(co2_saved), 0.0) FROM reports \
                 WHERE created_at >= ? AND created_at < ?",
            )
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

            timeline.push(TimelinePointDto {
                date: day.to_string(),
                reports,
                co2: round1(co2),
            });
        }

        Ok(timeline)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ==================== analytics service tests ====================
