use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;
use crate::utils::validation::parse_uuid_param;

use super::model::TestResult;
use super::service::{ResultsService, WEAK_CONCEPT_THRESHOLD};

/// Get the result for a session
#[utoipa::path(
    get,
    path = "/api/results/{sessionId}",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Test result", body = TestResult),
        (status = 400, description = "Invalid sessionId format"),
        (status = 403, description = "Not the result owner"),
        (status = 404, description = "Result not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<TestResult>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let result = ResultsService::get_result(&state.db, session_id, auth_user.user_id()?).await?;
    Ok(Json(result))
}

/// Weak-area analysis for a session's result
#[utoipa::path(
    get,
    path = "/api/results/{sessionId}/analysis",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Result with weakest concepts highlighted"),
        (status = 400, description = "Invalid sessionId format"),
        (status = 404, description = "Result not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_analysis(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let result = ResultsService::get_result(&state.db, session_id, auth_user.user_id()?).await?;

    let weakest: Vec<_> = result
        .concept_performance
        .0
        .iter()
        .filter(|cp| cp.accuracy < WEAK_CONCEPT_THRESHOLD)
        .cloned()
        .collect();

    Ok(Json(json!({
        "result": result,
        "weakest_concepts": weakest,
    })))
}

/// Result history for a user
#[utoipa::path(
    get,
    path = "/api/results/user/{userId}/history",
    params(("userId" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Results ordered newest first", body = [TestResult]),
        (status = 400, description = "Invalid userId format"),
        (status = 403, description = "History belongs to another user")
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<TestResult>>, AppError> {
    let user_id = parse_uuid_param(&user_id, "userId")?;

    // Callers may read their own history; admins may read anyone's.
    if auth_user.user_id()? != user_id && auth_user.role() != "admin" {
        return Err(AppError::forbidden("Access denied"));
    }

    let results = ResultsService::get_user_history(&state.db, user_id, &pagination).await?;
    Ok(Json(results))
}

/// Score a submitted session
#[utoipa::path(
    post,
    path = "/api/results/{sessionId}/calculate",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Calculated (or previously calculated) result", body = TestResult),
        (status = 400, description = "Session not yet submitted"),
        (status = 403, description = "Not the session owner or CSRF failure"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn calculate_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<TestResult>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let result =
        ResultsService::calculate_result(&state.db, session_id, auth_user.user_id()?).await?;
    Ok(Json(result))
}
