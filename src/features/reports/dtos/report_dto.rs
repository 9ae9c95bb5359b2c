use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::recyclers::dtos::CenterResponseDto;
use crate::features::recyclers::models::RecyclerCenter;
use crate::features::reports::models::{Report, ReportStatus};
use crate::modules::storage::UploadStore;

/// Report submission request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateReportDto {
    /// Photo of the e-waste item
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Optional id of the recycling center to assign the report to
    #[schema(example = 1)]
    pub recycler_id: Option<i64>,
}

/// Public view of a submitted report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    /// URL the uploaded photo is served under
    #[schema(example = "/uploads/1_5f4dcc3b.jpg")]
    pub image_url: String,
    #[schema(example = "Circuit Board")]
    pub category: String,
    #[schema(example = 0.76)]
    pub confidence: f64,
    pub suggestion: String,
    /// Center the report is assigned to, when any
    pub recycler: Option<CenterResponseDto>,
    pub status: ReportStatus,
    pub co2_saved: f64,
    pub points_awarded: i64,
    pub created_at: DateTime<Utc>,
}

impl From<(Report, Option<RecyclerCenter>)> for ReportResponseDto {
    fn from((report, center): (Report, Option<RecyclerCenter>)) -> Self {
        Self {
            id: report.id,
            image_url: UploadStore::public_url(&report.image_path),
            category: report.category,
            confidence: report.confidence,
            suggestion: report.suggestion,
            recycler: center.map(CenterResponseDto::from),
            status: report.status,
            co2_saved: report.co2_saved,
            points_awarded: report.points_awarded,
            created_at: report.created_at,
        }
    }
}
