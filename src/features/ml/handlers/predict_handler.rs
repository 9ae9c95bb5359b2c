use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::ml::dtos::{PredictRequestDto, PredictionResponseDto};
use crate::features::ml::services::ClassifierService;
use crate::shared::types::ApiResponse;

/// Classify an e-waste image
///
/// Accepts multipart/form-data with a single `file` field. The prediction is
/// deterministic in the uploaded filename; an upload without a filename is
/// treated as "unknown".
#[utoipa::path(
    post,
    path = "/api/ml/predict",
    tag = "ml",
    request_body(
        content = PredictRequestDto,
        content_type = "multipart/form-data",
        description = "Image upload form; only the filename influences the prediction",
    ),
    responses(
        (status = 200, description = "Category prediction", body = ApiResponse<PredictionResponseDto>),
        (status = 400, description = "Missing file field or unreadable multipart data")
    )
)]
pub async fn predict(
    State(service): State<Arc<ClassifierService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PredictionResponseDto>>, AppError> {
    let mut file_name: Option<String> = None;
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                has_file = true;
                file_name = field.file_name().map(|s| s.to_string());

                // The bytes do not influence the prediction; drain them so
                // the multipart stream stays consumable.
                field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    if !has_file {
        return Err(AppError::BadRequest("File is required".to_string()));
    }

    let filename = file_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let prediction = service.predict(&filename);

    Ok(Json(ApiResponse::success(
        Some(prediction.into()),
        None,
        None,
    )))
}

// ==================== predict handler tests ====================
