use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Account role stored as text in the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Recycler,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Recycler => write!(f, "recycler"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// Database model for a portal account
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub points: i64,
    pub level: i64,
    pub total_co2_saved: f64,
    pub total_items_recycled: i64,
    pub created_at: DateTime<Utc>,
    pub last_active: Option<DateTime<Utc>>,
}
