use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_uuid_param;
use crate::validator::ValidatedJson;

use super::model::{
    QuestionTime, SaveAnswerDto, SessionAnswer, SessionState, TestSession, TrackTimeDto,
};
use super::service::TestSessionService;

/// Start a test session
#[utoipa::path(
    post,
    path = "/api/tests/{testId}/start",
    params(("testId" = String, Path, description = "Test id")),
    responses(
        (status = 201, description = "Session started", body = TestSession),
        (status = 400, description = "Invalid testId format or session already in progress"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "CSRF failure"),
        (status = 404, description = "Test not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sessions"
)]
#[instrument(skip(state, auth_user))]
pub async fn start_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(test_id): Path<String>,
) -> Result<(StatusCode, Json<TestSession>), AppError> {
    let test_id = parse_uuid_param(&test_id, "testId")?;
    let session =
        TestSessionService::start_session(&state.db, auth_user.user_id()?, test_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Save or overwrite an answer
#[utoipa::path(
    put,
    path = "/api/tests/sessions/{sessionId}/answer",
    params(("sessionId" = String, Path, description = "Session id")),
    request_body = SaveAnswerDto,
    responses(
        (status = 200, description = "Answer recorded", body = SessionAnswer),
        (status = 400, description = "Invalid sessionId format or inactive session"),
        (status = 403, description = "Not the session owner or CSRF failure"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sessions"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn save_answer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
    ValidatedJson(dto): ValidatedJson<SaveAnswerDto>,
) -> Result<Json<SessionAnswer>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let answer =
        TestSessionService::save_answer(&state.db, session_id, auth_user.user_id()?, dto).await?;
    Ok(Json(answer))
}

/// Accumulate time spent on a question
#[utoipa::path(
    put,
    path = "/api/tests/sessions/{sessionId}/time",
    params(("sessionId" = String, Path, description = "Session id")),
    request_body = TrackTimeDto,
    responses(
        (status = 200, description = "Time recorded", body = QuestionTime),
        (status = 400, description = "Invalid sessionId format or inactive session"),
        (status = 403, description = "Not the session owner or CSRF failure"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sessions"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn track_time(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
    ValidatedJson(dto): ValidatedJson<TrackTimeDto>,
) -> Result<Json<QuestionTime>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let time =
        TestSessionService::track_question_time(&state.db, session_id, auth_user.user_id()?, dto)
            .await?;
    Ok(Json(time))
}

/// Submit the session
#[utoipa::path(
    post,
    path = "/api/tests/sessions/{sessionId}/submit",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session completed", body = TestSession),
        (status = 400, description = "Invalid sessionId format or inactive session"),
        (status = 403, description = "Not the session owner or CSRF failure"),
        (status = 404, description = "Session not found"),
        (status = 429, description = "Too many test submissions")
    ),
    security(("bearer_auth" = [])),
    tag = "Sessions"
)]
#[instrument(skip(state, auth_user))]
pub async fn submit_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<TestSession>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let session =
        TestSessionService::submit_test(&state.db, session_id, auth_user.user_id()?).await?;
    Ok(Json(session))
}

/// Auto-submit an expired session
#[utoipa::path(
    post,
    path = "/api/tests/sessions/{sessionId}/auto-submit",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session auto-submitted", body = TestSession),
        (status = 400, description = "Duration has not elapsed yet"),
        (status = 403, description = "Not the session owner or CSRF failure"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sessions"
)]
#[instrument(skip(state, auth_user))]
pub async fn auto_submit_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<TestSession>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let session =
        TestSessionService::auto_submit_on_timeout(&state.db, session_id, auth_user.user_id()?)
            .await?;
    Ok(Json(session))
}

/// Get the full session state for client resume
#[utoipa::path(
    get,
    path = "/api/tests/sessions/{sessionId}/state",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session state", body = SessionState),
        (status = 400, description = "Invalid sessionId format"),
        (status = 403, description = "Not the session owner"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sessions"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_session_state(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<SessionState>, AppError> {
    let session_id = parse_uuid_param(&session_id, "sessionId")?;
    let session_state =
        TestSessionService::get_session_state(&state.db, session_id, auth_user.user_id()?).await?;
    Ok(Json(session_state))
}
