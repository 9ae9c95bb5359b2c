use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::ml::services::Prediction;

/// Predict request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct PredictRequestDto {
    /// Photo of the item to classify
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Category prediction for an uploaded image
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponseDto {
    /// Waste category assigned to the item
    #[schema(example = "Circuit Board")]
    pub category: String,
    /// Classifier confidence, between 0.65 and 0.99
    #[schema(example = 0.76)]
    pub confidence: f64,
    /// Disposal suggestion for the category
    #[schema(example = "Handle carefully; recycle at e-waste facility.")]
    pub suggestion: String,
}

impl From<Prediction> for PredictionResponseDto {
    fn from(prediction: Prediction) -> Self {
        Self {
            category: prediction.category,
            confidence: prediction.confidence,
            suggestion: prediction.suggestion,
        }
    }
}
