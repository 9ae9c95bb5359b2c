use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::ml::{ClassifierService, EwasteVerifier};
use crate::features::recyclers::models::RecyclerCenter;
use crate::features::reports::models::{CreateReport, Report, ReportStatus};
use crate::features::reports::services::rewards;
use crate::features::reports::services::ReportService;
use crate::modules::storage::UploadStore;
use crate::shared::constants::DEFAULT_IMAGE_EXTENSION;

/// An image pulled out of a multipart submission
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Orchestrates the submission pipeline: store the upload, check it decodes
/// as an image, verify it shows e-waste, categorize it, then commit the
/// report together with its rewards. Every rejection path removes the
/// stored file so refused uploads leave nothing behind.
pub struct SubmissionService {
    reports: ReportService,
    store: Arc<UploadStore>,
    verifier: Arc<dyn EwasteVerifier>,
    classifier: ClassifierService,
    pool: SqlitePool,
}

impl SubmissionService {
    pub fn new(
        reports: ReportService,
        store: Arc<UploadStore>,
        verifier: Arc<dyn EwasteVerifier>,
        classifier: ClassifierService,
        pool: SqlitePool,
    ) -> Self {
        Self {
            reports,
            store,
            verifier,
            classifier,
            pool,
        }
    }

    pub async fn submit(
        &self,
        user_id: i64,
        image: UploadedImage,
        recycler_id: Option<i64>,
    ) -> Result<(Report, Option<RecyclerCenter>)> {
        let stored_name = stored_image_name(user_id, &image.filename);
        self.store.save(&stored_name, &image.data).await?;

        if image::load_from_memory(&image.data).is_err() {
            self.discard(&stored_name).await;
            return Err(AppError::BadRequest("Invalid image".to_string()));
        }

        let verdict = match self.verifier.verify(&image.data, &image.content_type).await {
            Ok(verdict) => verdict,
            Err(e) => {
                self.discard(&stored_name).await;
                return Err(e);
            }
        };
        if !verdict.is_ewaste {
            self.discard(&stored_name).await;
            return Err(AppError::Rejection(format!(
                "No e-waste detected in the image. Please upload an image containing \
                 electronic waste items. Reason: {}",
                verdict.reason
            )));
        }

        let prediction = self.classifier.predict(&image.filename);
        let rewards = rewards::compute(&prediction.category, prediction.confidence);

        // A zero id is treated the same as no assignment; an id that matches
        // no center is silently dropped rather than failing the submission.
        let center = match recycler_id.filter(|&id| id != 0) {
            Some(id) => self.fetch_center(id).await?,
            None => None,
        };
        let status = if center.is_some() {
            ReportStatus::Assigned
        } else {
            ReportStatus::Pending
        };

        let new_report = CreateReport {
            user_id,
            image_path: stored_name.clone(),
            category: prediction.category,
            confidence: prediction.confidence,
            suggestion: prediction.suggestion,
            recycler_id: center.as_ref().map(|c| c.id),
            status,
            co2_saved: rewards.co2_saved,
            points_awarded: rewards.points,
        };

        let report = match self.reports.create_with_rewards(new_report).await {
            Ok(report) => report,
            Err(e) => {
                self.discard(&stored_name).await;
                return Err(e);
            }
        };

        Ok((report, center))
    }

    /// Remove a stored upload on an abort path. Failures are logged by the
    /// store and must not replace the error that aborted the pipeline.
    async fn discard(&self, stored_name: &str) {
        let _ = self.store.delete(stored_name).await;
    }

    /// A user's reports newest first, each with its assigned center when set
    pub async fn history(&self, user_id: i64) -> Result<Vec<(Report, Option<RecyclerCenter>)>> {
        let reports = self.reports.list_by_user(user_id).await?;

        let mut centers: HashMap<i64, RecyclerCenter> = HashMap::new();
        let mut out = Vec::with_capacity(reports.len());
        for report in reports {
            let center = match report.recycler_id {
                Some(id) => match centers.get(&id) {
                    Some(cached) => Some(cached.clone()),
                    None => {
                        let fetched = self.fetch_center(id).await?;
                        if let Some(center) = &fetched {
                            centers.insert(id, center.clone());
                        }
                        fetched
                    }
                },
                None => None,
            };
            out.push((report, center));
        }

        Ok(out)
    }

    async fn fetch_center(&self, id: i64) -> Result<Option<RecyclerCenter>> {
        let center = sqlx::query_as::<_, RecyclerCenter>(
            "SELECT id, name, latitude, longitude, address, manager_id, approved, \
             total_recycled, total_co2_saved, performance_score, created_at \
             FROM recycler_centers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(center)
    }
}

/// Stored filename for an upload: the owner id plus a hash of the original
/// name, keeping the original extension. Uploads with the same name from
/// the same user overwrite each other instead of piling up.
fn stored_image_name(user_id: i64, filename: &str) -> String {
    let digest = Sha256::digest(filename.as_bytes());
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());

    format!("{}_{}{}", user_id, hex::encode(digest), extension)
}

// ==================== submission pipeline tests ====================
