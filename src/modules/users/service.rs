use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

use super::model::{OAuthProfile, PaginatedUsersResponse, User, UserFilterParams};

const USER_COLUMNS: &str =
    "id, google_id, email, name, profile_picture, role, created_at, last_login_at";

pub struct UserService;

impl UserService {
    /// Look up an identity by OAuth subject id, creating it with the
    /// default role on first login and touching `last_login_at` otherwise.
    #[instrument(skip(db, profile))]
    pub async fn find_or_create_from_oauth(
        db: &PgPool,
        profile: &OAuthProfile,
    ) -> Result<User, AppError> {
        let existing = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = now() WHERE google_id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&profile.google_id)
        .fetch_optional(db)
        .await?;

        if let Some(user) = existing {
            return Ok(user);
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (google_id, email, name, profile_picture, role)
             VALUES ($1, $2, $3, $4, 'user')
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&profile.google_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.profile_picture)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    /// Re-hydrate an identity from its primary key.
    #[instrument(skip(db))]
    pub async fn find_by_id(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    #[instrument(skip(db))]
    pub async fn list_users(
        db: &PgPool,
        filters: &UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let email = filters.email.as_deref().unwrap_or("");
        let role = filters.role.as_deref().unwrap_or("");

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users
             WHERE ($1 = '' OR email ILIKE '%' || $1 || '%')
               AND ($2 = '' OR role = $2)",
        )
        .bind(email)
        .bind(role)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users
             WHERE ($1 = '' OR email ILIKE '%' || $1 || '%')
               AND ($2 = '' OR role = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(role)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedUsersResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }
}
