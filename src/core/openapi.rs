use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::handlers as admin_handlers;
use crate::features::analytics::{dtos as analytics_dtos, handlers as analytics_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::ml::{dtos as ml_dtos, handlers as ml_handlers};
use crate::features::recyclers::{dtos as recyclers_dtos, handlers as recyclers_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        // Users
        users_handlers::get_me,
        users_handlers::get_stats,
        // ML
        ml_handlers::predict,
        // Reports
        reports_handlers::create_report,
        reports_handlers::history,
        // Recyclers
        recyclers_handlers::list_centers,
        recyclers_handlers::create_center,
        recyclers_handlers::claim_center,
        recyclers_handlers::assigned_reports,
        recyclers_handlers::update_report_status,
        // Admin
        admin_handlers::approve_center,
        admin_handlers::list_users,
        // Analytics
        analytics_handlers::analytics_overview,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::RegisterCenterDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::AuthResponseDto,
            ApiResponse<auth_dtos::AuthResponseDto>,
            // Users
            users_models::UserRole,
            users_dtos::UserResponseDto,
            users_dtos::UserStatsDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<users_dtos::UserStatsDto>,
            // ML
            ml_dtos::PredictRequestDto,
            ml_dtos::PredictionResponseDto,
            ApiResponse<ml_dtos::PredictionResponseDto>,
            // Reports
            reports_models::ReportStatus,
            reports_dtos::CreateReportDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            // Recyclers
            recyclers_dtos::CenterResponseDto,
            recyclers_dtos::CreateCenterDto,
            recyclers_dtos::UpdateReportStatusDto,
            ApiResponse<recyclers_dtos::CenterResponseDto>,
            ApiResponse<Vec<recyclers_dtos::CenterResponseDto>>,
            // Admin
            ApiResponse<Vec<String>>,
            // Analytics
            analytics_dtos::ContributorDto,
            analytics_dtos::CenterPerformanceDto,
            analytics_dtos::TimelinePointDto,
            analytics_dtos::AnalyticsOverviewDto,
            ApiResponse<analytics_dtos::AnalyticsOverviewDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profile and contribution stats"),
        (name = "ml", description = "Standalone e-waste categorization"),
        (name = "reports", description = "E-waste report submission and history"),
        (name = "recyclers", description = "Recycling centers and assigned reports"),
        (name = "admin", description = "Center approval and account oversight (admin only)"),
        (name = "analytics", description = "Platform-wide rollups (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "E-Waste Portal API",
        version = "0.1.0",
        description = "API documentation for the e-waste recycling portal",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
