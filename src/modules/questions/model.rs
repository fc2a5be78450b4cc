use chrono::Datelike;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// A question in the bank. `options` is stored as jsonb.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub content: String,
    #[schema(value_type = Vec<QuestionOption>)]
    pub options: Json<Vec<QuestionOption>>,
    pub correct_answer: String,
    pub explanation: String,
    pub concept_id: Uuid,
    pub sub_concept: Option<String>,
    pub difficulty: String,
    pub source: String,
    pub year_appeared: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

fn validate_options(options: &Vec<QuestionOption>) -> Result<(), ValidationError> {
    if options.len() < 2 {
        return Err(ValidationError::new("options")
            .with_message("At least 2 options are required".into()));
    }

    for option in options {
        if option.id.trim().is_empty() || option.text.trim().is_empty() {
            return Err(ValidationError::new("options")
                .with_message("Every option must have an id and text".into()));
        }
    }

    Ok(())
}

fn validate_question_dto(dto: &CreateQuestionDto) -> Result<(), ValidationError> {
    if !dto.options.iter().any(|opt| opt.id == dto.correct_answer) {
        return Err(ValidationError::new("correct_answer")
            .with_message("Correct answer must match one of the option ids".into()));
    }

    if let Some(year) = dto.year_appeared {
        let current_year = chrono::Utc::now().year();
        if year < 1990 || year > current_year {
            return Err(ValidationError::new("year_appeared")
                .with_message("Year appeared must be between 1990 and the current year".into()));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = validate_question_dto))]
pub struct CreateQuestionDto {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<QuestionOption>,
    #[validate(length(min = 1, message = "Correct answer is required"))]
    pub correct_answer: String,
    #[validate(length(min = 1, message = "Explanation is required"))]
    pub explanation: String,
    pub concept_id: Uuid,
    pub sub_concept: Option<String>,
    pub difficulty: Difficulty,
    #[validate(length(min = 1, message = "Source is required"))]
    pub source: String,
    pub year_appeared: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkImportDto {
    #[validate(length(min = 1, message = "At least one question is required"))]
    #[validate(nested)]
    pub questions: Vec<CreateQuestionDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkImportResult {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Query parameters for filtering questions.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuestionFilterParams {
    #[serde(default, deserialize_with = "crate::utils::serde::deserialize_optional_uuid")]
    pub concept_id: Option<Uuid>,
    pub difficulty: Option<Difficulty>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedQuestionsResponse {
    pub data: Vec<Question>,
    pub meta: crate::utils::pagination::PaginationMeta,
}
