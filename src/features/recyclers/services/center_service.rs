use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::recyclers::dtos::CreateCenterDto;
use crate::features::recyclers::models::RecyclerCenter;

const CENTER_COLUMNS: &str = "id, name, latitude, longitude, address, manager_id, approved, \
                              total_recycled, total_co2_saved, performance_score, created_at";

/// Demo centers seeded the first time the listing is requested on an
/// empty table, so the map view has something to show.
const DEMO_CENTERS: [(&str, f64, f64, bool, f64); 3] = [
    ("GreenCycle Hub", 28.6139, 77.2090, true, 78.5),
    ("EcoReclaim Center", 12.9716, 77.5946, true, 82.0),
    ("Renew Tech Recyclers", 19.0760, 72.8777, false, 60.0),
];

/// Service for recycling center listing, registration, and claiming
pub struct CenterService {
    pool: SqlitePool,
}

impl CenterService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All centers, seeding the demo set when the table is empty
    pub async fn list_all(&self) -> Result<Vec<RecyclerCenter>> {
        let centers = self.fetch_all().await?;
        if !centers.is_empty() {
            return Ok(centers);
        }

        self.seed_demo_centers().await?;
        self.fetch_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<RecyclerCenter> {
        sqlx::query_as::<_, RecyclerCenter>(&format!(
            "SELECT {CENTER_COLUMNS} FROM recycler_centers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Center not found".to_string()))
    }

    /// Register a center. New centers start unapproved and unmanaged;
    /// an admin approves them before they can be claimed.
    pub async fn create(&self, dto: CreateCenterDto) -> Result<RecyclerCenter> {
        let center = sqlx::query_as::<_, RecyclerCenter>(&format!(
            r#"
            INSERT INTO recycler_centers (name, latitude, longitude, address, approved, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING {CENTER_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(&dto.address)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create center: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Center {} ({}) registered", center.id, center.name);
        Ok(center)
    }

    /// Claim an approved center as its manager. Claiming a center you
    /// already manage succeeds and changes nothing; a center managed by
    /// someone else is a conflict.
    pub async fn claim(&self, center_id: i64, user_id: i64) -> Result<RecyclerCenter> {
        let center = self.get_by_id(center_id).await?;

        if !center.approved {
            return Err(AppError::BadRequest("Center not yet approved".to_string()));
        }
        if let Some(manager_id) = center.manager_id {
            if manager_id != user_id {
                return Err(AppError::Conflict("Center already claimed".to_string()));
            }
        }

        // The WHERE clause repeats the manager check so two concurrent
        // claims cannot both win.
        let claimed = sqlx::query_as::<_, RecyclerCenter>(&format!(
            r#"
            UPDATE recycler_centers
            SET manager_id = ?
            WHERE id = ? AND (manager_id IS NULL OR manager_id = ?)
            RETURNING {CENTER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(center_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to claim center: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::Conflict("Center already claimed".to_string()))?;

        tracing::info!("Center {} claimed by user {}", center_id, user_id);
        Ok(claimed)
    }

    async fn fetch_all(&self) -> Result<Vec<RecyclerCenter>> {
        let centers = sqlx::query_as::<_, RecyclerCenter>(&format!(
            "SELECT {CENTER_COLUMNS} FROM recycler_centers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(centers)
    }

    async fn seed_demo_centers(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (name, latitude, longitude, approved, performance_score) in DEMO_CENTERS {
            sqlx::query(
                r#"
                INSERT INTO recycler_centers
                    (name, latitude, longitude, approved, performance_score, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(name)
            .bind(latitude)
            .bind(longitude)
            .bind(approved)
            .bind(performance_score)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to seed demo centers: {:?}", e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await?;

        tracing::info!("Seeded {} demo centers", DEMO_CENTERS.len());
        Ok(())
    }
}

// ==================== center service tests ====================
