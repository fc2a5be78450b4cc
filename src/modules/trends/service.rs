use chrono::Datelike;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::trends::TrendsConfig;
use crate::utils::errors::AppError;

use super::model::{
    ConceptRanking, ConceptTrend, PredictionFallback, TopicImportance, TrendData,
    YearlyDistribution,
};

const TREND_COLUMNS: &str = "id, concept_id, frequency, importance, yearly_distribution, last_updated";

/// Importance blends how often a concept appears with how recently it
/// appeared: recency weight decays by 10% per year.
pub fn calculate_importance(
    frequency: f64,
    yearly_distribution: &YearlyDistribution,
    current_year: i32,
) -> f64 {
    if yearly_distribution.is_empty() {
        return frequency;
    }

    let mut recency_bonus = 0.0;
    let mut total_questions = 0i64;

    for (year, count) in yearly_distribution {
        let Ok(year) = year.parse::<i32>() else {
            continue;
        };
        let years_ago = (current_year - year).max(0);
        recency_bonus += *count as f64 * 0.9f64.powi(years_ago);
        total_questions += count;
    }

    if total_questions == 0 {
        return frequency;
    }

    let normalized_recency = recency_bonus / total_questions as f64;
    frequency * 0.7 + normalized_recency * 0.3
}

pub struct TrendAnalysisService;

impl TrendAnalysisService {
    /// Recompute frequency and importance for every concept and upsert the
    /// trend rows.
    #[instrument(skip(db))]
    pub async fn analyze_trends(db: &PgPool) -> Result<Vec<ConceptTrend>, AppError> {
        let total_questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(db)
            .await?;

        if total_questions == 0 {
            return Ok(Vec::new());
        }

        let concepts: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM concepts ORDER BY name")
                .fetch_all(db)
                .await?;

        let current_year = chrono::Utc::now().year();
        let mut trends = Vec::with_capacity(concepts.len());

        for (concept_id, _name) in concepts {
            let concept_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE concept_id = $1")
                    .bind(concept_id)
                    .fetch_one(db)
                    .await?;

            let frequency = concept_count as f64 / total_questions as f64;

            let yearly: Vec<(i32, i64)> = sqlx::query_as(
                "SELECT year_appeared, COUNT(*) FROM questions
                 WHERE concept_id = $1 AND year_appeared IS NOT NULL
                 GROUP BY year_appeared
                 ORDER BY year_appeared",
            )
            .bind(concept_id)
            .fetch_all(db)
            .await?;

            let yearly_distribution: YearlyDistribution = yearly
                .into_iter()
                .map(|(year, count)| (year.to_string(), count))
                .collect();

            let importance = calculate_importance(frequency, &yearly_distribution, current_year);

            let trend = sqlx::query_as::<_, ConceptTrend>(&format!(
                "INSERT INTO concept_trends (concept_id, frequency, importance, yearly_distribution)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (concept_id) DO UPDATE
                 SET frequency = EXCLUDED.frequency,
                     importance = EXCLUDED.importance,
                     yearly_distribution = EXCLUDED.yearly_distribution,
                     last_updated = now()
                 RETURNING {}",
                TREND_COLUMNS
            ))
            .bind(concept_id)
            .bind(frequency)
            .bind(importance)
            .bind(Json(&yearly_distribution))
            .fetch_one(db)
            .await?;

            trends.push(trend);
        }

        Ok(trends)
    }

    /// Concepts ordered by frequency, then importance.
    #[instrument(skip(db))]
    pub async fn get_concept_ranking(db: &PgPool) -> Result<Vec<ConceptRanking>, AppError> {
        #[derive(sqlx::FromRow)]
        struct RankedRow {
            concept_id: Uuid,
            concept_name: String,
            frequency: f64,
            importance: f64,
            yearly_distribution: Json<YearlyDistribution>,
        }

        let rows = sqlx::query_as::<_, RankedRow>(
            "SELECT ct.concept_id, c.name AS concept_name, ct.frequency, ct.importance,
                    ct.yearly_distribution
             FROM concept_trends ct
             JOIN concepts c ON ct.concept_id = c.id
             ORDER BY ct.frequency DESC, ct.importance DESC",
        )
        .fetch_all(db)
        .await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| ConceptRanking {
                concept_id: row.concept_id,
                concept_name: row.concept_name,
                rank: index + 1,
                frequency: row.frequency,
                importance: row.importance,
                yearly_distribution: row.yearly_distribution.0,
            })
            .collect())
    }

    #[instrument(skip(db))]
    pub async fn get_trend_data(db: &PgPool) -> Result<TrendData, AppError> {
        let rankings = Self::get_concept_ranking(db).await?;
        let last_updated: Option<chrono::DateTime<chrono::Utc>> =
            sqlx::query_scalar("SELECT MAX(last_updated) FROM concept_trends")
                .fetch_one(db)
                .await?;
        let total_questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(db)
            .await?;

        Ok(TrendData {
            rankings,
            last_updated,
            total_questions,
        })
    }

    #[instrument(skip(db))]
    pub async fn get_concept_trend(
        db: &PgPool,
        concept_id: Uuid,
    ) -> Result<ConceptTrend, AppError> {
        sqlx::query_as::<_, ConceptTrend>(&format!(
            "SELECT {} FROM concept_trends WHERE concept_id = $1",
            TREND_COLUMNS
        ))
        .bind(concept_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("No trend data for this concept"))
    }

    /// Proxy the external prediction service, falling back to static
    /// defaults when it is unreachable.
    #[instrument(skip(http, config))]
    pub async fn get_prediction(
        http: &reqwest::Client,
        config: &TrendsConfig,
    ) -> serde_json::Value {
        let url = format!("{}/predict", config.ml_service_url);

        let upstream = async {
            http.get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<serde_json::Value>()
                .await
        }
        .await;

        match upstream {
            Ok(prediction) => prediction,
            Err(err) => {
                warn!(error = %err, "Prediction service unavailable, serving static defaults");
                serde_json::to_value(Self::static_prediction_fallback())
                    .unwrap_or_else(|_| serde_json::json!({}))
            }
        }
    }

    pub fn static_prediction_fallback() -> PredictionFallback {
        let topic = |name: &str, score: i32| TopicImportance {
            topic: name.to_string(),
            score,
        };

        PredictionFallback {
            message: "Prediction service unavailable".to_string(),
            topic_importance: vec![
                topic("Data Structures", 85),
                topic("Algorithms", 90),
                topic("Operating Systems", 75),
                topic("DBMS", 80),
                topic("Computer Networks", 70),
            ],
            high_priority_topics: vec![
                "Algorithms".to_string(),
                "Data Structures".to_string(),
                "DBMS".to_string(),
            ],
        }
    }
}
