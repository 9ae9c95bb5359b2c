use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::recyclers::models::RecyclerCenter;
use crate::features::reports::models::ReportStatus;

/// Public view of a recycling center
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CenterResponseDto {
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

impl From<RecyclerCenter> for CenterResponseDto {
    fn from(c: RecyclerCenter) -> Self {
        Self {
            id: c.id,
            name: c.name,
            latitude: c.latitude,
            longitude: c.longitude,
            address: c.address,
            manager_id: c.manager_id,
            approved: c.approved,
            total_recycled: c.total_recycled,
            total_co2_saved: c.total_co2_saved,
            performance_score: c.performance_score,
            created_at: c.created_at,
        }
    }
}

/// Request DTO for registering a new center (admin only, starts unapproved)
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCenterDto {
    #[validate(length(min = 1, max = 200, message = "Center name must be 1-200 characters"))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    pub address: Option<String>,
}

/// Request DTO for advancing an assigned report's status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    /// Target status, only "received" and "recycled" are accepted
    #[schema(example = "recycled")]
    pub status: ReportStatus,
}
