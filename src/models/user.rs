use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{approved_users, pending_users, users};

/// Authenticated caller. The auth middleware inserts this into request
/// extensions; handlers read it back to attribute every store operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "staff@yatai.example")]
    pub email: String,
    #[schema(example = "Yakitori123")]
    pub password: String,
    #[schema(example = "Yakitori123")]
    pub password_confirmation: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub email: String,
    /// Always true: a fresh account waits for an admin to approve it.
    pub approval_pending: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "staff@yatai.example")]
    pub email: String,
    #[schema(example = "Yakitori123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: users::Model, approved: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            approved,
            created_at: user.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingUserResponse {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<pending_users::Model> for PendingUserResponse {
    fn from(row: pending_users::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovedUserResponse {
    pub id: i64,
    pub email: String,
    pub approved_at: DateTime<Utc>,
    pub approved_by: String,
}

impl From<approved_users::Model> for ApprovedUserResponse {
    fn from(row: approved_users::Model) -> Self {
        Self {
            id: row.id,
            email: row.email,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
        }
    }
}
