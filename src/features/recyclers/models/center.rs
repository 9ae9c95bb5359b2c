use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a recycling center
#[derive(Debug, Clone, FromRow)]
pub struct RecyclerCenter {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub manager_id: Option<i64>,
    pub approved: bool,
    pub total_recycled: i64,
    pub total_co2_saved: f64,
    pub performance_score: f64,
    pub created_at: DateTime<Utc>,
}
