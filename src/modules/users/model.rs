//! User identity models and DTOs.
//!
//! A user is created on registration or on first OAuth login and never
//! hard-deleted. `password_hash` stays out of these structs; the login path
//! selects it into a service-local row type instead.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// System roles. Stored as a lowercase string column on `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }
}

/// A user identity in the system.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub google_id: Option<String>,
    pub email: String,
    pub name: String,
    pub profile_picture: Option<String>,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login_at: chrono::DateTime<chrono::Utc>,
}

/// Profile fields from a verified OAuth identity, used to find or create
/// the corresponding user row.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub profile_picture: Option<String>,
}

/// Query parameters for the admin user listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserFilterParams {
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

/// Paginated response containing users.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: crate::utils::pagination::PaginationMeta,
}
