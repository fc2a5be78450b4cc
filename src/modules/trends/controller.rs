use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_uuid_param;

use super::model::{ConceptRanking, ConceptTrend, TrendData};
use super::service::TrendAnalysisService;

/// Get aggregate trend data
#[utoipa::path(
    get,
    path = "/api/trends",
    responses(
        (status = 200, description = "Trend data with rankings", body = TrendData),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Trends"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_trends(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<TrendData>, AppError> {
    let data = TrendAnalysisService::get_trend_data(&state.db).await?;
    Ok(Json(data))
}

/// Get concept rankings
#[utoipa::path(
    get,
    path = "/api/trends/rankings",
    responses(
        (status = 200, description = "Concepts ranked by frequency", body = [ConceptRanking]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Trends"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_rankings(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<ConceptRanking>>, AppError> {
    let rankings = TrendAnalysisService::get_concept_ranking(&state.db).await?;
    Ok(Json(rankings))
}

/// Recompute trend data (admin only)
#[utoipa::path(
    post,
    path = "/api/trends/refresh",
    responses(
        (status = 200, description = "Recomputed trends", body = [ConceptTrend]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required or CSRF failure")
    ),
    security(("bearer_auth" = [])),
    tag = "Trends"
)]
#[instrument(skip(state))]
pub async fn refresh_trends(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConceptTrend>>, AppError> {
    let trends = TrendAnalysisService::analyze_trends(&state.db).await?;
    Ok(Json(trends))
}

/// Get trend data for one concept
#[utoipa::path(
    get,
    path = "/api/trends/concept/{conceptId}",
    params(("conceptId" = String, Path, description = "Concept id")),
    responses(
        (status = 200, description = "Trend row for the concept", body = ConceptTrend),
        (status = 400, description = "Invalid conceptId format"),
        (status = 404, description = "No trend data for this concept")
    ),
    security(("bearer_auth" = [])),
    tag = "Trends"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_concept_trend(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(concept_id): Path<String>,
) -> Result<Json<ConceptTrend>, AppError> {
    let concept_id = parse_uuid_param(&concept_id, "conceptId")?;
    let trend = TrendAnalysisService::get_concept_trend(&state.db, concept_id).await?;
    Ok(Json(trend))
}

/// Exam topic prediction, proxied from the external service
#[utoipa::path(
    get,
    path = "/api/trends/prediction",
    responses(
        (status = 200, description = "Prediction payload, or static defaults when the service is unavailable"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Trends"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_prediction(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Json<serde_json::Value> {
    let prediction =
        TrendAnalysisService::get_prediction(&state.http, &state.trends_config).await;
    Json(prediction)
}
