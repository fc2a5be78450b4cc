use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle states of a test session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    AutoSubmitted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::AutoSubmitted => "auto_submitted",
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct TestSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub status: String,
    pub total_time_spent: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct SessionAnswer {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: String,
    pub marked_for_review: bool,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct QuestionTime {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub time_spent: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaveAnswerDto {
    pub question_id: Uuid,
    #[validate(length(min = 1, max = 10, message = "Selected answer is required"))]
    pub selected_answer: String,
    #[serde(default)]
    pub marked_for_review: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TrackTimeDto {
    pub question_id: Uuid,
    #[validate(range(min = 0, message = "Time spent must be non-negative"))]
    pub time_spent: i32,
}

/// Full state of a session for client resume.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionState {
    pub session: TestSession,
    pub answers: Vec<SessionAnswer>,
    pub question_times: Vec<QuestionTime>,
    pub remaining_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::AutoSubmitted).unwrap(),
            "\"auto_submitted\""
        );
        assert_eq!(SessionStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_save_answer_dto_validation() {
        use validator::Validate;

        let dto = SaveAnswerDto {
            question_id: Uuid::new_v4(),
            selected_answer: "b".to_string(),
            marked_for_review: false,
        };
        assert!(dto.validate().is_ok());

        let empty = SaveAnswerDto {
            question_id: Uuid::new_v4(),
            selected_answer: "".to_string(),
            marked_for_review: false,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_track_time_dto_rejects_negative() {
        use validator::Validate;

        let dto = TrackTimeDto {
            question_id: Uuid::new_v4(),
            time_spent: -5,
        };
        assert!(dto.validate().is_err());
    }
}
