//! Role-based authorization middleware for Axum
//!
//! Authentication is handled by the `AuthUser` extractor; this module only
//! decides whether an already-authenticated caller may proceed.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware function that checks if the authenticated user has one of the
/// required roles.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    check_any_role(&auth_user, &allowed_roles)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Middleware for admin-only routes.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::role::require_admin;
///
/// let admin_routes = Router::new()
///     .route("/questions", post(create_question))
///     .layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Helper function to check if a user has a specific role in controller logic
pub fn check_role(auth_user: &AuthUser, required_role: UserRole) -> Result<(), AppError> {
    let user_role = parse_role_from_string(auth_user.role())?;

    if user_role != required_role {
        return Err(AppError::forbidden("Admin access required"));
    }

    Ok(())
}

/// Helper function to check if a user has any of the specified roles
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    let user_role = parse_role_from_string(auth_user.role())?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden("Admin access required"));
    }

    Ok(())
}

/// Parse a role string into a UserRole enum
pub fn parse_role_from_string(role_str: &str) -> Result<UserRole, AppError> {
    match role_str {
        "user" => Ok(UserRole::User),
        "admin" => Ok(UserRole::Admin),
        "student" => Ok(UserRole::Student),
        _ => Err(AppError::internal(anyhow::anyhow!(
            "Invalid role: {}",
            role_str
        ))),
    }
}
