use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Lifecycle of a report. Transitions are forward-only:
/// pending -> assigned -> received -> recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Assigned,
    Received,
    Recycled,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::Assigned => write!(f, "assigned"),
            ReportStatus::Received => write!(f, "received"),
            ReportStatus::Recycled => write!(f, "recycled"),
        }
    }
}

/// Database model for one submitted e-waste item.
///
/// `co2_saved` and `points_awarded` are fixed at creation and never
/// recomputed; only user/center aggregates move as the status advances.
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub category: String,
    pub confidence: f64,
    pub suggestion: String,
    pub recycler_id: Option<i64>,
    pub status: ReportStatus,
    pub co2_saved: f64,
    pub points_awarded: i64,
    pub created_at: DateTime<Utc>,
    pub recycled_at: Option<DateTime<Utc>>,
}

/// Fields for inserting a report row
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub user_id: i64,
    pub image_path: String,
    pub category: String,
    pub confidence: f64,
    pub suggestion: String,
    pub recycler_id: Option<i64>,
    pub status: ReportStatus,
    pub co2_saved: f64,
    pub points_awarded: i64,
}
