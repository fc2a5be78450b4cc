use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_uuid_param;
use crate::validator::ValidatedJson;

use super::model::{GenerateTestRequest, Test, TestQuestion};
use super::service::TestGenerationService;

/// Generate a randomized mock test
#[utoipa::path(
    post,
    path = "/api/tests/generate",
    request_body = GenerateTestRequest,
    responses(
        (status = 201, description = "Generated test", body = Test),
        (status = 400, description = "Invalid configuration or empty question pool"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "CSRF failure")
    ),
    security(("bearer_auth" = [])),
    tag = "Tests"
)]
#[instrument(skip(state, _auth_user, config))]
pub async fn generate_test(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(config): ValidatedJson<GenerateTestRequest>,
) -> Result<(StatusCode, Json<Test>), AppError> {
    let test = TestGenerationService::generate_mock_test(&state.db, config).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

/// Get a test by id
#[utoipa::path(
    get,
    path = "/api/tests/{testId}",
    params(("testId" = String, Path, description = "Test id")),
    responses(
        (status = 200, description = "The test", body = Test),
        (status = 400, description = "Invalid testId format"),
        (status = 404, description = "Test not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tests"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_test(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(test_id): Path<String>,
) -> Result<Json<Test>, AppError> {
    let test_id = parse_uuid_param(&test_id, "testId")?;
    let test = TestGenerationService::get_test(&state.db, test_id).await?;
    Ok(Json(test))
}

/// Get a test's questions with answers stripped
#[utoipa::path(
    get,
    path = "/api/tests/{testId}/questions",
    params(("testId" = String, Path, description = "Test id")),
    responses(
        (status = 200, description = "Questions in test order", body = [TestQuestion]),
        (status = 400, description = "Invalid testId format"),
        (status = 404, description = "Test not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tests"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_test_questions(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(test_id): Path<String>,
) -> Result<Json<Vec<TestQuestion>>, AppError> {
    let test_id = parse_uuid_param(&test_id, "testId")?;
    let questions = TestGenerationService::get_test_questions(&state.db, test_id).await?;
    Ok(Json(questions))
}
