use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptPerformance {
    pub concept_id: Uuid,
    pub concept_name: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub accuracy: f64,
    pub average_time_per_question: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptWeakness {
    pub concept_name: String,
    pub accuracy: f64,
    pub questions_attempted: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub concept_name: String,
    pub textbook_chapters: Vec<String>,
    pub practice_topics: Vec<String>,
    pub priority: RecommendationPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Feedback {
    pub overall_message: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<ConceptWeakness>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct TestResult {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub incorrect_answers: i32,
    pub unanswered: i32,
    pub percentage: f64,
    #[schema(value_type = Vec<ConceptPerformance>)]
    pub concept_performance: Json<Vec<ConceptPerformance>>,
    #[schema(value_type = Feedback)]
    pub feedback: Json<Feedback>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering_high_first() {
        let mut priorities = vec![
            RecommendationPriority::Low,
            RecommendationPriority::High,
            RecommendationPriority::Medium,
        ];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![
                RecommendationPriority::High,
                RecommendationPriority::Medium,
                RecommendationPriority::Low,
            ]
        );
    }
}
