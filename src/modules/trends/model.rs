use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Question counts per exam year, keyed by the year as a string.
pub type YearlyDistribution = BTreeMap<String, i64>;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct ConceptTrend {
    pub id: Uuid,
    pub concept_id: Uuid,
    pub frequency: f64,
    pub importance: f64,
    #[schema(value_type = Object)]
    pub yearly_distribution: Json<YearlyDistribution>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConceptRanking {
    pub concept_id: Uuid,
    pub concept_name: String,
    pub rank: usize,
    pub frequency: f64,
    pub importance: f64,
    #[schema(value_type = Object)]
    pub yearly_distribution: YearlyDistribution,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendData {
    pub rankings: Vec<ConceptRanking>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
    pub total_questions: i64,
}

/// One entry of the static prediction fallback.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicImportance {
    pub topic: String,
    pub score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionFallback {
    pub message: String,
    pub topic_importance: Vec<TopicImportance>,
    pub high_priority_topics: Vec<String>,
}
