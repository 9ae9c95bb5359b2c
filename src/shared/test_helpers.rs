#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::features::recyclers::models::RecyclerCenter;
#[cfg(test)]
use crate::features::reports::models::ReportStatus;
#[cfg(test)]
use crate::features::users::models::{User, UserRole};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};
#[cfg(test)]
use chrono::Utc;
#[cfg(test)]
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// In-memory database with migrations applied.
///
/// A single connection: every connection to `sqlite::memory:` is its own
/// database, so the pool must never open a second one.
#[cfg(test)]
#[allow(dead_code)]
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// File-backed database for tests that need real connection concurrency.
/// Returns the TempDir so the file outlives the pool.
#[cfg(test)]
#[allow(dead_code)]
pub async fn setup_test_db_file() -> (SqlitePool, tempfile::TempDir) {
    use crate::core::config::DatabaseConfig;
    use crate::core::database::create_pool;

    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("test.db").display()),
        max_connections: 5,
        min_connections: 1,
        acquire_timeout_secs: 5,
        idle_timeout_secs: 600,
        max_lifetime_secs: 1800,
    };

    let pool = create_pool(&config).await.expect("failed to open test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    (pool, dir)
}

#[cfg(test)]
#[allow(dead_code)]
pub async fn create_test_user(pool: &SqlitePool, email: &str, role: UserRole) -> User {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, name, role, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, email, password_hash, name, role, points, level,
                  total_co2_saved, total_items_recycled, created_at, last_active
        "#,
    )
    .bind(email)
    .bind("$argon2id$test-only-hash")
    .bind("Test User")
    .bind(role)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("failed to insert test user")
}

#[cfg(test)]
#[allow(dead_code)]
pub async fn create_test_center(
    pool: &SqlitePool,
    name: &str,
    manager_id: Option<i64>,
) -> RecyclerCenter {
    sqlx::query_as::<_, RecyclerCenter>(
        r#"
        INSERT INTO recycler_centers (name, latitude, longitude, address, manager_id, approved, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        RETURNING id, name, latitude, longitude, address, manager_id, approved,
                  total_recycled, total_co2_saved, performance_score, created_at
        "#,
    )
    .bind(name)
    .bind(-6.2)
    .bind(106.8)
    .bind("Test Address")
    .bind(manager_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("failed to insert test center")
}

/// Insert a report row directly, bypassing the submission pipeline.
#[cfg(test)]
#[allow(dead_code)]
pub async fn create_test_report(
    pool: &SqlitePool,
    user_id: i64,
    recycler_id: Option<i64>,
    status: ReportStatus,
    co2_saved: f64,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO reports
            (user_id, image_path, category, confidence, suggestion,
             recycler_id, status, co2_saved, points_awarded, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(format!("{}_test.jpg", user_id))
    .bind("Circuit Board")
    .bind(0.76)
    .bind("Handle carefully; recycle at e-waste facility.")
    .bind(recycler_id)
    .bind(status)
    .bind(co2_saved)
    .bind(17)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("failed to insert test report")
}

#[cfg(test)]
#[allow(dead_code)]
pub fn auth_user(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        id: user.id,
        role: user.role,
    }
}

/// Minimal valid PNG for upload tests
#[cfg(test)]
#[allow(dead_code)]
pub fn sample_png_bytes() -> Vec<u8> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

    let img = RgbaImage::from_fn(8, 8, |_, _| Rgba([20, 120, 60, 255]));
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(img.as_raw(), 8, 8, ExtendedColorType::Rgba8)
        .expect("failed to encode test png");
    buf
}

/// Wrap a router so every request carries the given identity, bypassing
/// the bearer-token middleware.
#[cfg(test)]
#[allow(dead_code)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
