use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, RegisterRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::TokenService;
use crate::features::users::models::{User, UserRole};

const USER_COLUMNS: &str = "id, email, password_hash, name, role, points, level, \
                            total_co2_saved, total_items_recycled, created_at, last_active";

/// Service for authentication operations (register, login, token checks)
pub struct AuthService {
    pool: SqlitePool,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, token_service: Arc<TokenService>) -> Self {
        Self {
            pool,
            token_service,
        }
    }

    /// Register a new account. Recycler accounts must carry a center
    /// payload; the center is created unapproved and managed by the new
    /// user, in the same transaction as the user row.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<User> {
        let role = dto.role.unwrap_or(UserRole::User);

        if role == UserRole::Recycler && dto.center.is_none() {
            return Err(AppError::BadRequest(
                "Recycler registration requires center name and coordinates".to_string(),
            ));
        }

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&dto.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&dto.password)?;

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.name)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(center) = &dto.center {
            sqlx::query(
                r#"
                INSERT INTO recycler_centers
                    (name, latitude, longitude, address, manager_id, approved, created_at)
                VALUES (?, ?, ?, ?, ?, 0, ?)
                "#,
            )
            .bind(&center.name)
            .bind(center.latitude)
            .bind(center.longitude)
            .bind(&center.address)
            .bind(user.id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create center for recycler: {:?}", e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await?;

        tracing::info!("Registered {} account: {}", user.role, user.email);

        Ok(user)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(&dto.password, &user.password_hash) {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let (access_token, expires_in) = self.token_service.issue(user.id)?;

        Ok(AuthResponseDto {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            user: user.into(),
        })
    }

    /// Resolve a bearer token into the request identity. The user row must
    /// still exist; deleted accounts are treated as unauthenticated.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let user_id = self.token_service.decode(token)?;

        let role: Option<UserRole> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let role = role.ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(AuthenticatedUser { id: user_id, role })
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AppError::Internal("Failed to hash password".to_string())
        })
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// ==================== auth service tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::features::auth::dtos::RegisterCenterDto;
    use crate::shared::test_helpers::setup_test_db;
    use fake::{faker::internet::en::SafeEmail, Fake};
    use std::time::Duration;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl: Duration::from_secs(3600),
        }))
    }

    fn register_dto(email: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            name: "Test User".to_string(),
            role: None,
            center: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_login_round_trip() {
        let pool = setup_test_db().await;
        let service = AuthService::new(pool, token_service());
        let email: String = SafeEmail().fake();

        let user = service.register(register_dto(&email)).await.unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.points, 0);
        assert_eq!(user.level, 1);

        let auth = service
            .login(LoginRequestDto {
                email: email.clone(),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(auth.token_type, "bearer");
        assert_eq!(auth.user.email, email);

        let identity = service.authenticate(&auth.access_token).await.unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() {
        let pool = setup_test_db().await;
        let service = AuthService::new(pool, token_service());

        service
            .register(register_dto("dup@example.com"))
            .await
            .unwrap();
        let err = service
            .register(register_dto("dup@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Email already registered"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_rejected() {
        let pool = setup_test_db().await;
        let service = AuthService::new(pool, token_service());

        service
            .register(register_dto("who@example.com"))
            .await
            .unwrap();
        let err = service
            .login(LoginRequestDto {
                email: "who@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_register_recycler_creates_unapproved_center() {
        let pool = setup_test_db().await;
        let service = AuthService::new(pool.clone(), token_service());

        let mut dto = register_dto("center@example.com");
        dto.role = Some(UserRole::Recycler);
        dto.center = Some(RegisterCenterDto {
            name: "Green Drop-off".to_string(),
            latitude: -6.2,
            longitude: 106.8,
            address: None,
        });

        let user = service.register(dto).await.unwrap();

        let (manager_id, approved): (Option<i64>, bool) = sqlx::query_as(
            "SELECT manager_id, approved FROM recycler_centers WHERE name = 'Green Drop-off'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(manager_id, Some(user.id));
        assert!(!approved);
    }

    #[tokio::test]
    async fn test_register_recycler_without_center_rejected() {
        let pool = setup_test_db().await;
        let service = AuthService::new(pool.clone(), token_service());

        let mut dto = register_dto("nocenter@example.com");
        dto.role = Some(UserRole::Recycler);

        let err = service.register(dto).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Nothing committed
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[tokio::test]
    async fn test_authenticate_missing_user_rejected() {
        let pool = setup_test_db().await;
        let tokens = token_service();
        let service = AuthService::new(pool, tokens.clone());

        let (token, _) = tokens.issue(12345).unwrap();
        let err = service.authenticate(&token).await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "User not found"));
    }
}
