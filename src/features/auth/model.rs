use serde::{Deserialize, Serialize};

use crate::features::users::models::UserRole;

/// Identity attached to the request after bearer-token validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_recycler(&self) -> bool {
        self.role == UserRole::Recycler
    }
}

/// JWT claims carried by portal access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    /// Expiry as a unix timestamp
    pub exp: usize,
}
