use axum::Json;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::{PaginatedUsersResponse, User, UserFilterParams};
use super::service::UserService;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = UserService::find_by_id(&state.db, auth_user.user_id()?).await?;
    Ok(Json(user))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("email" = Option<String>, Query, description = "Filter by email substring"),
        ("role" = Option<String>, Query, description = "Filter by exact role"),
    ),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(&state.db, &filters).await?;
    Ok(Json(users))
}
