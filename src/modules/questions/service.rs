use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

use super::model::{
    BulkImportDto, BulkImportResult, CreateQuestionDto, PaginatedQuestionsResponse, Question,
    QuestionFilterParams,
};

const QUESTION_COLUMNS: &str = "id, content, options, correct_answer, explanation, concept_id, \
     sub_concept, difficulty, source, year_appeared, created_at, updated_at";

pub struct QuestionService;

impl QuestionService {
    #[instrument(skip(db, dto))]
    pub async fn create_question(
        db: &PgPool,
        dto: CreateQuestionDto,
    ) -> Result<Question, AppError> {
        let concept: Option<Uuid> = sqlx::query_scalar("SELECT id FROM concepts WHERE id = $1")
            .bind(dto.concept_id)
            .fetch_optional(db)
            .await?;

        if concept.is_none() {
            return Err(AppError::bad_request("Concept does not exist"));
        }

        let question = sqlx::query_as::<_, Question>(&format!(
            "INSERT INTO questions
                 (content, options, correct_answer, explanation, concept_id,
                  sub_concept, difficulty, source, year_appeared)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            QUESTION_COLUMNS
        ))
        .bind(&dto.content)
        .bind(Json(&dto.options))
        .bind(&dto.correct_answer)
        .bind(&dto.explanation)
        .bind(dto.concept_id)
        .bind(&dto.sub_concept)
        .bind(dto.difficulty.as_str())
        .bind(&dto.source)
        .bind(dto.year_appeared)
        .fetch_one(db)
        .await?;

        Ok(question)
    }

    #[instrument(skip(db))]
    pub async fn get_questions(
        db: &PgPool,
        filters: &QuestionFilterParams,
    ) -> Result<PaginatedQuestionsResponse, AppError> {
        let difficulty = filters.difficulty.map(|d| d.as_str().to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM questions
             WHERE ($1::uuid IS NULL OR concept_id = $1)
               AND ($2::varchar IS NULL OR difficulty = $2)",
        )
        .bind(filters.concept_id)
        .bind(&difficulty)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions
             WHERE ($1::uuid IS NULL OR concept_id = $1)
               AND ($2::varchar IS NULL OR difficulty = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
            QUESTION_COLUMNS
        ))
        .bind(filters.concept_id)
        .bind(&difficulty)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedQuestionsResponse {
            data,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_question_by_id(db: &PgPool, id: Uuid) -> Result<Question, AppError> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Question not found"))
    }

    #[instrument(skip(db))]
    pub async fn get_questions_by_ids(
        db: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = ANY($1)",
            QUESTION_COLUMNS
        ))
        .bind(ids)
        .fetch_all(db)
        .await?;

        Ok(questions)
    }

    /// Full replace of a question's fields.
    #[instrument(skip(db, dto))]
    pub async fn update_question(
        db: &PgPool,
        id: Uuid,
        dto: CreateQuestionDto,
    ) -> Result<Question, AppError> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "UPDATE questions
             SET content = $2, options = $3, correct_answer = $4, explanation = $5,
                 concept_id = $6, sub_concept = $7, difficulty = $8, source = $9,
                 year_appeared = $10, updated_at = now()
             WHERE id = $1
             RETURNING {}",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .bind(&dto.content)
        .bind(Json(&dto.options))
        .bind(&dto.correct_answer)
        .bind(&dto.explanation)
        .bind(dto.concept_id)
        .bind(&dto.sub_concept)
        .bind(dto.difficulty.as_str())
        .bind(&dto.source)
        .bind(dto.year_appeared)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Question not found"))?;

        Ok(question)
    }

    #[instrument(skip(db))]
    pub async fn delete_question(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Question not found"));
        }

        Ok(())
    }

    /// Import a batch, skipping invalid entries and reporting each failure.
    #[instrument(skip(db, dto))]
    pub async fn bulk_import(db: &PgPool, dto: BulkImportDto) -> Result<BulkImportResult, AppError> {
        let mut imported = 0;
        let mut errors = Vec::new();

        for (index, question) in dto.questions.into_iter().enumerate() {
            if let Err(validation) = question.validate() {
                errors.push(format!("Question {}: {}", index + 1, validation));
                continue;
            }

            match Self::create_question(db, question).await {
                Ok(_) => imported += 1,
                Err(err) => errors.push(format!("Question {}: {}", index + 1, err.error)),
            }
        }

        Ok(BulkImportResult {
            imported,
            failed: errors.len(),
            errors,
        })
    }

    #[instrument(skip(db))]
    pub async fn count_by_concept(db: &PgPool, concept_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE concept_id = $1")
            .bind(concept_id)
            .fetch_one(db)
            .await?;

        Ok(count)
    }
}
