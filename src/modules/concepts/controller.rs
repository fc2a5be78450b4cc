use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_uuid_param;
use crate::validator::ValidatedJson;

use super::model::{Concept, CreateConceptDto, UpdateConceptDto};
use super::service::ConceptService;

/// List all concepts
#[utoipa::path(
    get,
    path = "/api/admin/concepts",
    responses(
        (status = 200, description = "All concepts", body = [Concept]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "Concepts"
)]
#[instrument(skip(state))]
pub async fn get_concepts(State(state): State<AppState>) -> Result<Json<Vec<Concept>>, AppError> {
    let concepts = ConceptService::get_all_concepts(&state.db).await?;
    Ok(Json(concepts))
}

/// Get a concept by id
#[utoipa::path(
    get,
    path = "/api/admin/concepts/{id}",
    params(("id" = String, Path, description = "Concept id")),
    responses(
        (status = 200, description = "The concept", body = Concept),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Concept not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Concepts"
)]
#[instrument(skip(state))]
pub async fn get_concept(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Concept>, AppError> {
    let id = parse_uuid_param(&id, "id")?;
    let concept = ConceptService::get_concept_by_id(&state.db, id).await?;
    Ok(Json(concept))
}

/// List concepts in a category
#[utoipa::path(
    get,
    path = "/api/admin/concepts/category/{category}",
    params(("category" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Concepts in the category", body = [Concept])
    ),
    security(("bearer_auth" = [])),
    tag = "Concepts"
)]
#[instrument(skip(state))]
pub async fn get_concepts_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Concept>>, AppError> {
    let concepts = ConceptService::get_concepts_by_category(&state.db, &category).await?;
    Ok(Json(concepts))
}

/// Create a concept
#[utoipa::path(
    post,
    path = "/api/admin/concepts",
    request_body = CreateConceptDto,
    responses(
        (status = 201, description = "Concept created", body = Concept),
        (status = 400, description = "Validation error or duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Concepts"
)]
#[instrument(skip(state, dto))]
pub async fn create_concept(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateConceptDto>,
) -> Result<(StatusCode, Json<Concept>), AppError> {
    let concept = ConceptService::create_concept(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(concept)))
}

/// Update a concept
#[utoipa::path(
    put,
    path = "/api/admin/concepts/{id}",
    params(("id" = String, Path, description = "Concept id")),
    request_body = UpdateConceptDto,
    responses(
        (status = 200, description = "Concept updated", body = Concept),
        (status = 400, description = "Invalid id format"),
        (status = 404, description = "Concept not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Concepts"
)]
#[instrument(skip(state, dto))]
pub async fn update_concept(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateConceptDto>,
) -> Result<Json<Concept>, AppError> {
    let id = parse_uuid_param(&id, "id")?;
    let concept = ConceptService::update_concept(&state.db, id, dto).await?;
    Ok(Json(concept))
}

/// Delete a concept
#[utoipa::path(
    delete,
    path = "/api/admin/concepts/{id}",
    params(("id" = String, Path, description = "Concept id")),
    responses(
        (status = 204, description = "Concept deleted"),
        (status = 400, description = "Invalid id format or concept still has questions"),
        (status = 404, description = "Concept not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Concepts"
)]
#[instrument(skip(state))]
pub async fn delete_concept(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_uuid_param(&id, "id")?;
    ConceptService::delete_concept(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
