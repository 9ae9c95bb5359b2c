use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Leaderboard entry for the overview
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContributorDto {
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = 340)]
    pub points: i64,
}

/// Recycled-report count for one center
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CenterPerformanceDto {
    #[schema(example = "GreenCycle Hub")]
    pub name: String,
    #[schema(example = 12)]
    pub recycled: i64,
}

/// One day of the trailing-week timeline
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimelinePointDto {
    #[schema(example = "2025-06-01")]
    pub date: String,
    #[schema(example = 4)]
    pub reports: i64,
    #[schema(example = 7.2)]
    pub co2: f64,
}

/// Platform-wide rollup served to the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsOverviewDto {
    pub by_category: BTreeMap<String, i64>,
    pub top_contributors: Vec<ContributorDto>,
    pub center_performance: Vec<CenterPerformanceDto>,
    #[schema(example = 128.4)]
    pub co2_saved_kg: f64,
    #[schema(example = 57)]
    pub total_users: i64,
    #[schema(example = 6)]
    pub total_centers: i64,
    #[schema(example = 214)]
    pub total_reports: i64,
    #[schema(example = 90)]
    pub total_recycled: i64,
    #[schema(example = 25.0)]
    pub growth_rate: f64,
    pub impact_timeline: Vec<TimelinePointDto>,
}
