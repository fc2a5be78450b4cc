use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::json;
use tracing::instrument;

use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_uuid_param;
use crate::validator::ValidatedJson;

use super::model::{
    BulkImportDto, BulkImportResult, CreateQuestionDto, PaginatedQuestionsResponse, Question,
    QuestionFilterParams,
};
use super::service::QuestionService;

/// List questions with optional filters
#[utoipa::path(
    get,
    path = "/api/admin/questions",
    params(
        ("concept_id" = Option<String>, Query, description = "Filter by concept"),
        ("difficulty" = Option<String>, Query, description = "Filter by difficulty"),
    ),
    responses(
        (status = 200, description = "Paginated questions", body = PaginatedQuestionsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state))]
pub async fn get_questions(
    State(state): State<AppState>,
    Query(filters): Query<QuestionFilterParams>,
) -> Result<Json<PaginatedQuestionsResponse>, AppError> {
    let questions = QuestionService::get_questions(&state.db, &filters).await?;
    Ok(Json(questions))
}

/// Get a question by id
#[utoipa::path(
    get,
    path = "/api/admin/questions/{id}",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "The question", body = Question),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Question not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state))]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Question>, AppError> {
    let id = parse_uuid_param(&id, "id")?;
    let question = QuestionService::get_question_by_id(&state.db, id).await?;
    Ok(Json(question))
}

/// Create a question
#[utoipa::path(
    post,
    path = "/api/admin/questions",
    request_body = CreateQuestionDto,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state, dto))]
pub async fn create_question(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateQuestionDto>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    let question = QuestionService::create_question(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Replace a question
#[utoipa::path(
    put,
    path = "/api/admin/questions/{id}",
    params(("id" = String, Path, description = "Question id")),
    request_body = CreateQuestionDto,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Question not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state, dto))]
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<CreateQuestionDto>,
) -> Result<Json<Question>, AppError> {
    let id = parse_uuid_param(&id, "id")?;
    let question = QuestionService::update_question(&state.db, id, dto).await?;
    Ok(Json(question))
}

/// Delete a question
#[utoipa::path(
    delete,
    path = "/api/admin/questions/{id}",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Question not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state))]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_uuid_param(&id, "id")?;
    QuestionService::delete_question(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk import questions
#[utoipa::path(
    post,
    path = "/api/admin/questions/import",
    request_body = BulkImportDto,
    responses(
        (status = 200, description = "Import summary", body = BulkImportResult),
        (status = 400, description = "Questions array missing or empty"),
        (status = 429, description = "Too many bulk import requests")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state, dto))]
pub async fn bulk_import_questions(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<BulkImportDto>,
) -> Result<Json<BulkImportResult>, AppError> {
    let result = QuestionService::bulk_import(&state.db, dto).await?;
    Ok(Json(result))
}

/// Count questions tagged with a concept
#[utoipa::path(
    get,
    path = "/api/admin/questions/concept/{conceptId}/count",
    params(("conceptId" = String, Path, description = "Concept id")),
    responses(
        (status = 200, description = "Question count for the concept"),
        (status = 400, description = "Invalid conceptId format")
    ),
    security(("bearer_auth" = [])),
    tag = "Questions"
)]
#[instrument(skip(state))]
pub async fn count_questions_by_concept(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let concept_id = parse_uuid_param(&concept_id, "conceptId")?;
    let count = QuestionService::count_by_concept(&state.db, concept_id).await?;
    Ok(Json(json!({ "concept_id": concept_id, "count": count })))
}
